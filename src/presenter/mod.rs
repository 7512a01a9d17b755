//! UI state that doesn't depend on how it is drawn.

pub mod accessor;
pub mod download;
pub mod folder;
pub mod resolver;
pub mod updates;
pub mod view;

pub use accessor::BridgeAccessor;
pub use download::{DownloadOrchestrator, FreezeDryOutcome};
pub use folder::FolderSelector;
pub use resolver::LinkResolver;
pub use updates::{BackendUpdate, SharedState};
