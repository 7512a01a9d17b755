pub mod backend;
pub mod freeze_dry;
pub mod ytdlp;
