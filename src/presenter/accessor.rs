use std::sync::Arc;

use tokio::sync::watch;

use crate::ports::bridge::Bridge;

type Slot = Option<Arc<dyn Bridge>>;

/// Shared handle to a bridge that shows up once the host is ready.
///
/// Clones observe the same slot. The slot is filled at most once and stays
/// filled for the rest of the session.
#[derive(Clone)]
pub struct BridgeAccessor {
    slot: Arc<watch::Sender<Slot>>,
}

impl BridgeAccessor {
    pub fn pending() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
        }
    }

    /// Install the bridge. Returns `false` (and leaves the first one in place)
    /// if a bridge was already installed.
    pub fn ready(&self, bridge: Arc<dyn Bridge>) -> bool {
        let installed = self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(bridge);
            true
        });
        if !installed {
            log::warn!("Bridge was already ready, ignoring second ready signal");
        }
        installed
    }

    pub fn get(&self) -> Option<Arc<dyn Bridge>> {
        self.slot.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Wait for the ready signal. Resolves immediately once ready.
    pub async fn wait_ready(&self) -> Arc<dyn Bridge> {
        let mut receiver = self.slot.subscribe();
        loop {
            if let Some(bridge) = receiver.borrow_and_update().clone() {
                return bridge;
            }
            // The sender lives in `self`, so the channel can't close while we wait.
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl std::fmt::Debug for BridgeAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeAccessor")
            .field("ready", &self.is_ready())
            .finish()
    }
}
