use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::model::FreezeDryReport;
use crate::ports::bridge::{Bridge, BridgeError};

/// The only failure text the user gets to see, whatever went wrong.
pub const FAILURE_MESSAGE: &str = "Freeze drying failed. Check the link and try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreezeDryOutcome {
    Completed(FreezeDryReport),
    Failed {
        message: &'static str,
        error: BridgeError,
    },
    /// A run was already going; nothing was started.
    Busy,
}

/// Runs freeze dry requests one at a time.
///
/// Clones share the busy flag, so the UI can check it while a clone runs the
/// request on another task.
#[derive(Debug, Clone, Default)]
pub struct DownloadOrchestrator {
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag however the request ends.
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl DownloadOrchestrator {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                busy: self.busy.clone(),
            })
    }

    /// Single attempt, no retry, no cancellation.
    pub async fn freeze_dry(&self, bridge: &dyn Bridge, link: &str) -> FreezeDryOutcome {
        let Some(_guard) = self.acquire() else {
            log::debug!("Freeze dry already running, ignoring request for {}", link);
            return FreezeDryOutcome::Busy;
        };

        log::info!("Freeze drying {}", link);
        match bridge.freeze_dry(link).await {
            Ok(report) => {
                log::info!(
                    "Freeze dried {}: {} downloaded, {} skipped, {} failed",
                    link,
                    report.downloaded,
                    report.skipped,
                    report.failed
                );
                FreezeDryOutcome::Completed(report)
            }
            Err(error) => {
                log::error!("Freeze dry of {} failed: {}", link, error);
                FreezeDryOutcome::Failed {
                    message: FAILURE_MESSAGE,
                    error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::bridge::MockBridge;
    use std::path::PathBuf;

    const LINK: &str = "https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy";

    fn report() -> FreezeDryReport {
        FreezeDryReport {
            total: 2,
            downloaded: 2,
            skipped: 0,
            failed: 0,
            directory: PathBuf::from("/music"),
        }
    }

    #[tokio::test]
    async fn test_busy_only_while_running_on_success() {
        let orchestrator = DownloadOrchestrator::default();
        let observer = orchestrator.clone();

        let mut bridge = MockBridge::new();
        bridge.expect_freeze_dry().times(1).returning(move |_| {
            assert!(observer.is_busy());
            Ok(report())
        });

        assert!(!orchestrator.is_busy());
        let outcome = orchestrator.freeze_dry(&bridge, LINK).await;
        assert_eq!(outcome, FreezeDryOutcome::Completed(report()));
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_failure_resets_busy_and_sets_message() {
        let orchestrator = DownloadOrchestrator::default();
        let observer = orchestrator.clone();

        let mut bridge = MockBridge::new();
        bridge.expect_freeze_dry().times(1).returning(move |_| {
            assert!(observer.is_busy());
            Err(BridgeError::InvalidLink("no id".to_string()))
        });

        let outcome = orchestrator.freeze_dry(&bridge, LINK).await;
        assert_eq!(
            outcome,
            FreezeDryOutcome::Failed {
                message: FAILURE_MESSAGE,
                error: BridgeError::InvalidLink("no id".to_string()),
            }
        );
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_second_request_while_busy_is_refused() {
        let orchestrator = DownloadOrchestrator::default();
        let inner = orchestrator.clone();

        let mut nested = MockBridge::new();
        nested.expect_freeze_dry().never();
        let nested = Arc::new(nested);

        let mut bridge = MockBridge::new();
        bridge.expect_freeze_dry().times(1).returning(move |_| {
            let outcome = futures::executor::block_on(inner.freeze_dry(nested.as_ref(), LINK));
            assert_eq!(outcome, FreezeDryOutcome::Busy);
            Ok(report())
        });

        let outcome = orchestrator.freeze_dry(&bridge, LINK).await;
        assert!(matches!(outcome, FreezeDryOutcome::Completed(_)));
        assert!(!orchestrator.is_busy());
    }
}
