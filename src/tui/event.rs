use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::{Result, eyre::eyre};
use crossterm::event::{self, Event as CrosstermEvent};
use tokio::sync::mpsc;

use crate::presenter::download::{DownloadOrchestrator, FreezeDryOutcome};
use crate::presenter::folder::{fetch_chosen_folder, fetch_selected_folder};
use crate::presenter::resolver::{Notify, ResolveOutcome};
use crate::presenter::updates::{BackendUpdate, UpdateReceiver};
use crate::presenter::BridgeAccessor;

const TIMEOUT: Duration = Duration::from_millis(250);

/// Representation of all possible events.
#[derive(Clone, Debug)]
pub enum Event {
    /// Emitted by the terminal.
    Crossterm(CrosstermEvent),
    /// Emitted by the app itself, handled on the next loop iteration.
    App(AppEvent),
    /// Emitted by background tasks.
    Background(BackgroundEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    FreezeDry,
    ChooseFolder,
    Close,
}

#[derive(Clone, Debug)]
pub enum BackgroundEvent {
    BridgeReady,
    /// The backend couldn't be started. The UI stays usable, minus the backend.
    BridgeFailed(String),
    Resolved(ResolveOutcome),
    Folder(String),
    FreezeDryFinished(FreezeDryOutcome),
    Backend(BackendUpdate),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundRequest {
    RefreshFolder,
    ChooseFolder,
    FreezeDry(String),
    Close,
}

/// Event handler for the UI loop, plus the channel into the background worker.
#[derive(Debug)]
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    background_sender: mpsc::UnboundedSender<BackgroundRequest>,
}

impl EventHandler {
    /// Spawn the background worker. Must be called from within a tokio runtime.
    pub fn new(accessor: BridgeAccessor, orchestrator: DownloadOrchestrator) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (background_sender, background_receiver) = mpsc::unbounded_channel();

        let worker = BackgroundWorker {
            requests: background_receiver,
            sender: sender.clone(),
            accessor,
            orchestrator,
        };
        tokio::spawn(worker.run());

        Self {
            sender,
            receiver,
            background_sender,
        }
    }

    /// Start reading terminal events on a dedicated thread.
    pub fn listen_to_terminal(&self) {
        let reader = CrosstermEventThread {
            sender: self.sender.clone(),
        };
        thread::spawn(move || {
            if let Err(error) = reader.run() {
                log::error!("Terminal event thread stopped: {}", error);
            }
        });
    }

    /// Receives the next event, waiting until there is one.
    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| eyre!("Event channel closed"))
    }

    /// Queue an app event for the next loop iteration.
    pub fn send(&self, app_event: AppEvent) {
        // The receiver lives in `self`, so this can't fail
        let _ = self.sender.send(Event::App(app_event));
    }

    pub fn send_background_request(&self, request: BackgroundRequest) {
        let _ = self.background_sender.send(request);
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }

    /// Resolver callback posting outcomes into the event loop.
    pub fn resolve_notifier(&self) -> Notify {
        let sender = self.sender.clone();
        Arc::new(move |outcome: ResolveOutcome| {
            let _ = sender.send(Event::Background(BackgroundEvent::Resolved(outcome)));
        })
    }

    /// Forward every backend update into the event loop.
    pub fn forward_updates(&self, mut updates: UpdateReceiver) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                if sender
                    .send(Event::Background(BackgroundEvent::Backend(update)))
                    .is_err()
                {
                    break;
                }
            }
        });
    }
}

/// Reads crossterm events
struct CrosstermEventThread {
    sender: mpsc::UnboundedSender<Event>,
}

impl CrosstermEventThread {
    fn run(self) -> Result<()> {
        loop {
            if event::poll(TIMEOUT)? {
                let event = event::read()?;
                // Shutting down drops the receiver, that's when we stop
                if self.sender.send(Event::Crossterm(event)).is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// Runs bridge calls off the UI loop. Each request waits for the bridge and
/// runs on its own task, so a long freeze dry doesn't hold up folder changes.
struct BackgroundWorker {
    requests: mpsc::UnboundedReceiver<BackgroundRequest>,
    sender: mpsc::UnboundedSender<Event>,
    accessor: BridgeAccessor,
    orchestrator: DownloadOrchestrator,
}

impl BackgroundWorker {
    async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let accessor = self.accessor.clone();
            let orchestrator = self.orchestrator.clone();
            let sender = self.sender.clone();
            tokio::spawn(async move {
                let bridge = accessor.wait_ready().await;
                let event = match request {
                    BackgroundRequest::RefreshFolder => {
                        BackgroundEvent::Folder(fetch_selected_folder(bridge.as_ref()).await)
                    }
                    BackgroundRequest::ChooseFolder => {
                        BackgroundEvent::Folder(fetch_chosen_folder(bridge.as_ref()).await)
                    }
                    BackgroundRequest::FreezeDry(link) => BackgroundEvent::FreezeDryFinished(
                        orchestrator.freeze_dry(bridge.as_ref(), &link).await,
                    ),
                    BackgroundRequest::Close => match bridge.close().await {
                        // The backend answers through the update channel
                        Ok(()) => return,
                        Err(error) => {
                            log::warn!("Backend refused to close: {}", error);
                            BackgroundEvent::Backend(BackendUpdate::CloseRequested)
                        }
                    },
                };
                let _ = sender.send(Event::Background(event));
            });
        }
    }
}
