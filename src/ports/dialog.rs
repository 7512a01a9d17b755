use std::path::{Path, PathBuf};

/// Port trait for the host's folder picker.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FolderPicker: Send + Sync {
    /// `None` when the user cancelled or no dialog could be shown.
    async fn pick_folder(&self, start: &Path) -> Option<PathBuf>;
}

/// Native dialog through `rfd`.
pub struct NativeFolderPicker;

#[async_trait::async_trait]
impl FolderPicker for NativeFolderPicker {
    async fn pick_folder(&self, start: &Path) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_title("Choose where songs are saved")
            .set_directory(start)
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}
