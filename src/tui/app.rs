use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::prelude::{CrosstermBackend, Terminal};

use crate::model::FreezeDryReport;
use crate::presenter::updates::BackendUpdate;
use crate::presenter::view::{ResultView, build_view};
use crate::presenter::{
    BridgeAccessor, DownloadOrchestrator, FolderSelector, FreezeDryOutcome, LinkResolver,
    SharedState,
};
use crate::tui::event::{AppEvent, BackgroundEvent, BackgroundRequest, Event, EventHandler};
use crate::tui::input::handle_key_event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendState {
    Starting,
    Ready,
    Failed(String),
}

/// Shown when a request can't be served because the backend never came up.
pub const BACKEND_UNAVAILABLE: &str = "The backend isn't running, see the log for why";

pub struct App {
    pub running: bool,
    pub backend: BackendState,
    pub resolver: LinkResolver,
    pub shared: SharedState,
    pub folder: FolderSelector,
    pub orchestrator: DownloadOrchestrator,
    /// Result of the last freeze dry, shown above the folder line.
    pub message: Option<String>,
    pub scroll: usize,
    pub events: EventHandler,
}

impl App {
    pub fn new(
        accessor: BridgeAccessor,
        orchestrator: DownloadOrchestrator,
        events: EventHandler,
    ) -> Self {
        let backend = if accessor.is_ready() {
            BackendState::Ready
        } else {
            BackendState::Starting
        };
        Self {
            running: true,
            backend,
            resolver: LinkResolver::new(accessor, events.resolve_notifier()),
            shared: SharedState::default(),
            folder: FolderSelector::default(),
            orchestrator,
            message: None,
            scroll: 0,
            events,
        }
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        while self.running {
            terminal.draw(|frame| crate::tui::ui::render(frame, self))?;
            let event = self.events.next().await?;
            self.handle_event(event)?;
        }
        Ok(())
    }

    pub fn view(&self) -> ResultView {
        build_view(
            self.resolver.result(),
            &self.shared.search,
            &self.shared.downloads,
            self.shared.status,
        )
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Crossterm(event) => match event {
                CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    handle_key_event(self, key_event)?
                }
                CrosstermEvent::Paste(text) => {
                    let input = format!("{}{}", self.resolver.input(), text.trim());
                    self.set_input(&input);
                }
                _ => {}
            },
            Event::App(app_event) => self.handle_app_event(app_event),
            Event::Background(background_event) => self.handle_background_event(background_event),
        }
        Ok(())
    }

    /// Requests queued now would wait for a bridge that is never coming.
    fn refuse_without_backend(&mut self) -> bool {
        if let BackendState::Failed(ref error) = self.backend {
            log::debug!("Dropping request, backend failed: {}", error);
            self.message = Some(BACKEND_UNAVAILABLE.to_string());
            return true;
        }
        false
    }

    fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::FreezeDry => {
                if self.orchestrator.is_busy() || self.resolver.input().is_empty() {
                    return;
                }
                if self.refuse_without_backend() {
                    return;
                }
                self.message = None;
                self.events
                    .send_background_request(BackgroundRequest::FreezeDry(
                        self.resolver.input().to_string(),
                    ));
            }
            AppEvent::ChooseFolder => {
                if self.refuse_without_backend() {
                    return;
                }
                self.events
                    .send_background_request(BackgroundRequest::ChooseFolder);
            }
            AppEvent::Close => {
                if self.backend == BackendState::Ready {
                    self.events.send_background_request(BackgroundRequest::Close);
                } else {
                    self.quit();
                }
            }
        }
    }

    fn handle_background_event(&mut self, background_event: BackgroundEvent) {
        match background_event {
            BackgroundEvent::BridgeReady => {
                self.backend = BackendState::Ready;
                self.events
                    .send_background_request(BackgroundRequest::RefreshFolder);
                // Anything typed while starting up gets resolved now
                self.resolver.retry();
            }
            BackgroundEvent::BridgeFailed(error) => {
                log::error!("Backend failed to start: {}", error);
                self.backend = BackendState::Failed(error);
            }
            BackgroundEvent::Resolved(outcome) => {
                if self.resolver.apply(outcome) {
                    self.scroll = 0;
                }
            }
            BackgroundEvent::Folder(folder) => self.folder.set(folder),
            BackgroundEvent::FreezeDryFinished(outcome) => match outcome {
                FreezeDryOutcome::Completed(report) => {
                    self.message = Some(completion_message(&report));
                }
                FreezeDryOutcome::Failed { message, .. } => {
                    self.message = Some(message.to_string());
                }
                FreezeDryOutcome::Busy => {}
            },
            BackgroundEvent::Backend(BackendUpdate::CloseRequested) => self.quit(),
            BackgroundEvent::Backend(update) => self.shared.apply(update),
        }
    }

    pub fn set_input(&mut self, text: &str) {
        self.resolver.on_input(text);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.view().rows().len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

fn completion_message(report: &FreezeDryReport) -> String {
    let mut message = format!("Saved {} of {} songs", report.downloaded, report.total);
    if report.skipped > 0 {
        message.push_str(&format!(", {} already there", report.skipped));
    }
    if report.failed > 0 {
        message.push_str(&format!(", {} failed", report.failed));
    }
    message
}
