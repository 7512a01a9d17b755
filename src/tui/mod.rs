pub mod app;
pub mod event;
pub mod input;
pub mod ui;
pub mod widgets;

use std::io;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::config::Config;
use crate::ports::dialog::NativeFolderPicker;
use crate::presenter::{BridgeAccessor, DownloadOrchestrator, updates};
use crate::services::backend::LocalBackend;
use crate::tui::event::{BackgroundEvent, EventHandler};

/// Main entry point for the TUI
pub async fn run(config: Config) -> Result<()> {
    let accessor = BridgeAccessor::pending();
    let orchestrator = DownloadOrchestrator::default();
    let events = EventHandler::new(accessor.clone(), orchestrator.clone());

    let (update_sender, update_receiver) = updates::channel();
    events.forward_updates(update_receiver);
    start_backend(config, accessor.clone(), update_sender, &events);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    events.listen_to_terminal();
    let mut app = app::App::new(accessor, orchestrator, events);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

/// Build the backend off the UI loop and announce it once it's usable.
fn start_backend(
    config: Config,
    accessor: BridgeAccessor,
    updates: updates::UpdateSender,
    events: &EventHandler,
) {
    let sender = events.sender();
    tokio::spawn(async move {
        let folder = config.download_directory();
        let event = match LocalBackend::from_config(
            &config,
            folder,
            Box::new(NativeFolderPicker),
            updates,
        )
        .await
        {
            Ok(backend) => {
                accessor.ready(Arc::new(backend));
                BackgroundEvent::BridgeReady
            }
            Err(error) => BackgroundEvent::BridgeFailed(format!("{:#}", error)),
        };
        let _ = sender.send(event::Event::Background(event));
    });
}
