use crate::ports::bridge::Bridge;

/// Folder currently in effect, or an empty string if the backend couldn't say.
pub async fn fetch_selected_folder(bridge: &dyn Bridge) -> String {
    match bridge.get_selected_folder().await {
        Ok(folder) => folder,
        Err(error) => {
            log::warn!("Failed to get selected folder: {}", error);
            String::new()
        }
    }
}

/// Open the host picker. The returned path is taken as is, without checking it.
pub async fn fetch_chosen_folder(bridge: &dyn Bridge) -> String {
    match bridge.choose_folder().await {
        Ok(folder) => folder,
        Err(error) => {
            log::warn!("Failed to choose folder: {}", error);
            String::new()
        }
    }
}

/// Where songs will be saved, as last reported by the backend.
///
/// The background worker fetches the folder with [`fetch_selected_folder`] or
/// [`fetch_chosen_folder`] and the UI loop hands the answer to [`FolderSelector::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSelector {
    folder: String,
}

impl FolderSelector {
    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn set(&mut self, folder: String) {
        self.folder = folder;
    }
}
