use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, Paragraph, Wrap},
};

use crate::link::detected_label;
use crate::model::DownloadStatus;
use crate::presenter::resolver::ResolveState;
use crate::presenter::view::{Layout as ViewLayout, ResultView};
use crate::tui::app::{App, BackendState};
use crate::tui::widgets;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Link input
            Constraint::Length(1), // Detected type and id
            Constraint::Min(0),    // Result
            Constraint::Length(1), // Message
            Constraint::Length(1), // Folder
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_title(frame, chunks[0], app);
    widgets::render_input_field(frame, chunks[1], "Spotify link", app.resolver.input(), true);
    render_detected(frame, chunks[2], app);
    render_result(frame, chunks[3], app, &app.view());

    if let Some(ref message) = app.message {
        frame.render_widget(
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Yellow)),
            chunks[4],
        );
    }

    let folder = Paragraph::new(format!("Songs will be saved in {}", app.folder.folder()));
    frame.render_widget(folder, chunks[5]);

    let help = Paragraph::new("[Enter: Freeze dry] [Ctrl+O: Choose folder] [Ctrl+U: Clear] [Esc: Quit]")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[6]);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let status = match (&app.backend, app.shared.status) {
        (BackendState::Starting, _) => Span::styled("Starting...", Style::default().fg(Color::Yellow)),
        (BackendState::Failed(error), _) => Span::styled(
            format!("Backend unavailable: {}", error),
            Style::default().fg(Color::Red),
        ),
        (BackendState::Ready, _) if app.orchestrator.is_busy() => {
            Span::styled("Freeze drying...", Style::default().fg(Color::Green))
        }
        (BackendState::Ready, DownloadStatus::Completed) => Span::raw("Done"),
        (BackendState::Ready, _) => Span::raw("Ready"),
    };

    let title = Line::from(vec![
        Span::styled(
            "Spotidry",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        status,
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_detected(frame: &mut Frame, area: Rect, app: &App) {
    let input = app.resolver.input();
    if input.is_empty() {
        return;
    }

    // The label comes from the link text alone, so it stays up whatever the backend says
    let mut spans = vec![Span::raw(detected_label(input))];
    if app.resolver.is_loading() {
        spans.push(Span::styled("  loading...", Style::default().fg(Color::DarkGray)));
    } else if let ResolveState::Failed(error) = app.resolver.state() {
        spans.push(Span::styled(
            format!("  {}", error.source),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }), area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App, view: &ResultView) {
    let Some(ref header) = view.header else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    widgets::render_header(frame, chunks[0], header);

    let title = match view.layout {
        ViewLayout::List(ref rows) => format!("{} tracks", rows.len()),
        _ => String::new(),
    };
    let items: Vec<_> = view
        .rows()
        .iter()
        .skip(app.scroll)
        .map(widgets::row_item)
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::NONE).title(title));
    frame.render_widget(list, chunks[1]);
}
