use tokio::sync::mpsc;

use crate::model::{DownloadState, DownloadStatus, SearchState, SourceMatch, TrackProgress};

/// Everything the backend tells the UI without being asked.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendUpdate {
    /// A new run starts: forget matches and progress of the previous one.
    Reset,
    SearchResult { track_id: String, source: SourceMatch },
    Progress { track_id: String, fraction: f64 },
    Status(DownloadStatus),
    /// The backend asked the host to shut down.
    CloseRequested,
}

/// Backend side of the update channel.
///
/// Sends never fail loudly: once the UI is gone nobody is left to care.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    sender: mpsc::UnboundedSender<BackendUpdate>,
}

pub type UpdateReceiver = mpsc::UnboundedReceiver<BackendUpdate>;

pub fn channel() -> (UpdateSender, UpdateReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UpdateSender { sender }, receiver)
}

impl UpdateSender {
    pub fn send(&self, update: BackendUpdate) {
        let _ = self.sender.send(update);
    }

    pub fn reset(&self) {
        self.send(BackendUpdate::Reset);
    }

    pub fn search_result(&self, track_id: &str, source: SourceMatch) {
        self.send(BackendUpdate::SearchResult {
            track_id: track_id.to_string(),
            source,
        });
    }

    pub fn progress(&self, track_id: &str, fraction: f64) {
        self.send(BackendUpdate::Progress {
            track_id: track_id.to_string(),
            fraction,
        });
    }

    pub fn status(&self, status: DownloadStatus) {
        self.send(BackendUpdate::Status(status));
    }

    pub fn close_requested(&self) {
        self.send(BackendUpdate::CloseRequested);
    }
}

/// UI-owned copy of the backend driven state. Only `apply` mutates it.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    pub search: SearchState,
    pub downloads: DownloadState,
    pub status: DownloadStatus,
}

impl SharedState {
    /// Fold one update in. `CloseRequested` carries no state and is left to the caller.
    pub fn apply(&mut self, update: BackendUpdate) {
        match update {
            BackendUpdate::Reset => {
                self.search.clear();
                self.downloads.clear();
                self.status = DownloadStatus::Idle;
            }
            BackendUpdate::SearchResult { track_id, source } => {
                self.search.insert(track_id, source);
            }
            BackendUpdate::Progress { track_id, fraction } => {
                self.downloads.insert(track_id, TrackProgress { fraction });
            }
            BackendUpdate::Status(status) => self.status = status,
            BackendUpdate::CloseRequested => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str) -> SourceMatch {
        SourceMatch {
            id: id.to_string(),
            title: "Video".to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    #[tokio::test]
    async fn test_updates_arrive_in_order() {
        let (sender, mut receiver) = channel();
        sender.status(DownloadStatus::Downloading);
        sender.progress("t1", 0.5);
        drop(sender);

        assert_eq!(
            receiver.recv().await,
            Some(BackendUpdate::Status(DownloadStatus::Downloading))
        );
        assert_eq!(
            receiver.recv().await,
            Some(BackendUpdate::Progress {
                track_id: "t1".to_string(),
                fraction: 0.5
            })
        );
        assert_eq!(receiver.recv().await, None);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_ignored() {
        let (sender, receiver) = channel();
        drop(receiver);
        sender.progress("t1", 1.0);
    }

    #[test]
    fn test_apply_builds_state() {
        let mut state = SharedState::default();
        state.apply(BackendUpdate::Status(DownloadStatus::Downloading));
        state.apply(BackendUpdate::SearchResult {
            track_id: "t1".to_string(),
            source: source("v1"),
        });
        state.apply(BackendUpdate::Progress {
            track_id: "t1".to_string(),
            fraction: 0.25,
        });
        state.apply(BackendUpdate::Progress {
            track_id: "t1".to_string(),
            fraction: 0.75,
        });

        assert_eq!(state.status, DownloadStatus::Downloading);
        assert_eq!(state.downloads["t1"].fraction, 0.75);
        assert!(!state.downloads.contains_key("t2"));
        assert_eq!(state.search["t1"].id, "v1");
    }

    #[test]
    fn test_reset_clears_previous_run() {
        let mut state = SharedState::default();
        state.apply(BackendUpdate::Progress {
            track_id: "t1".to_string(),
            fraction: 1.0,
        });
        state.apply(BackendUpdate::Status(DownloadStatus::Completed));
        state.apply(BackendUpdate::Reset);

        assert!(state.downloads.is_empty());
        assert!(state.search.is_empty());
        assert_eq!(state.status, DownloadStatus::Idle);
    }
}
