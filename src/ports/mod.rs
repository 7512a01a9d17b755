pub mod bridge;
pub mod dialog;
pub mod source;
pub mod spotify;
