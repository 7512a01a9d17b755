use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::model::LinkResult;
use crate::ports::bridge::BridgeError;
use crate::presenter::accessor::BridgeAccessor;

/// Shorter input is never sent to the backend.
pub const MIN_LINK_LENGTH: usize = 5;
pub const DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Couldn't resolve `{link}`: {source}")]
pub struct ResolveError {
    pub link: String,
    pub source: BridgeError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Empty,
    /// Waiting for the bridge, the debounce or the reply.
    Pending,
    Resolved(LinkResult),
    Failed(ResolveError),
}

/// Reply to one resolution request, tagged with the token it was issued under.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub token: u64,
    pub link: String,
    pub result: Result<LinkResult, BridgeError>,
}

pub type Notify = Arc<dyn Fn(ResolveOutcome) + Send + Sync>;

/// Debounced link → metadata resolution.
///
/// Every input bumps a request token. A scheduled request only fires if its
/// token is still the latest once the debounce elapses, and its reply is only
/// applied if no newer input arrived meanwhile.
pub struct LinkResolver {
    accessor: BridgeAccessor,
    notify: Notify,
    latest: Arc<AtomicU64>,
    debounce: Duration,
    input: String,
    state: ResolveState,
}

impl LinkResolver {
    pub fn new(accessor: BridgeAccessor, notify: Notify) -> Self {
        Self::with_debounce(accessor, notify, DEBOUNCE)
    }

    pub fn with_debounce(accessor: BridgeAccessor, notify: Notify, debounce: Duration) -> Self {
        Self {
            accessor,
            notify,
            latest: Arc::new(AtomicU64::new(0)),
            debounce,
            input: String::new(),
            state: ResolveState::Empty,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &ResolveState {
        &self.state
    }

    pub fn result(&self) -> Option<&LinkResult> {
        match &self.state {
            ResolveState::Resolved(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == ResolveState::Pending
    }

    /// The link text changed. Must be called from within a tokio runtime.
    pub fn on_input(&mut self, text: &str) {
        self.input = text.to_string();
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if text.chars().count() < MIN_LINK_LENGTH {
            self.state = ResolveState::Empty;
            return;
        }
        self.state = ResolveState::Pending;

        let accessor = self.accessor.clone();
        let notify = self.notify.clone();
        let latest = self.latest.clone();
        let debounce = self.debounce;
        let link = text.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != token {
                return;
            }
            let Some(bridge) = accessor.get() else {
                log::debug!("Bridge not ready, not resolving {}", link);
                return;
            };

            log::debug!("Resolving link {}", link);
            let result = bridge.get_from_link(&link).await;
            notify(ResolveOutcome {
                token,
                link,
                result,
            });
        });
    }

    /// Re-issue the current input, e.g. once the bridge became ready.
    pub fn retry(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.on_input(&input);
    }

    /// Apply a reply. Returns `false` if it was superseded and discarded.
    pub fn apply(&mut self, outcome: ResolveOutcome) -> bool {
        if outcome.token != self.latest.load(Ordering::SeqCst) {
            log::debug!(
                "Discarding stale resolution for {} (token {})",
                outcome.link,
                outcome.token
            );
            return false;
        }

        self.state = match outcome.result {
            Ok(result) => ResolveState::Resolved(result),
            Err(source) => {
                log::warn!("Failed to resolve {}: {}", outcome.link, source);
                ResolveState::Failed(ResolveError {
                    link: outcome.link,
                    source,
                })
            }
        };
        true
    }
}
