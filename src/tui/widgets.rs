use ratatui::{
    prelude::*,
    widgets::{Block, Borders, ListItem, Paragraph},
};

use crate::presenter::view::{Header, Row};

const BAR_WIDTH: usize = 20;

/// Text bar for a row overlay: shaded cells are what's still left to download.
pub fn overlay_bar(overlay: f64) -> String {
    let shaded = (overlay.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(BAR_WIDTH - shaded),
        "░".repeat(shaded)
    )
}

/// Render an input field with focus indicator
pub fn render_input_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    is_focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(label)
        .border_style(if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });

    let text = if value.is_empty() {
        Span::styled(
            "Paste a Spotify track, album or playlist link",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::Cyan))
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

pub fn render_header(frame: &mut Frame, area: Rect, header: &Header) {
    let mut lines = vec![
        Line::from(Span::styled(
            header.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(header.subtitle.clone()),
    ];
    if let Some(ref cover_url) = header.cover_url {
        lines.push(Line::from(Span::styled(
            cover_url.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

/// One track: title and artists, plus the download bar once it has progress to show.
pub fn row_item(row: &Row) -> ListItem<'_> {
    let mut lines = vec![Line::from(vec![
        Span::styled(row.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" - "),
        Span::styled(row.artists.clone(), Style::default().fg(Color::Gray)),
    ])];

    if let Some(progress) = row.progress {
        let percent = (progress * 100.0).round();
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(overlay_bar(1.0 - progress), Style::default().fg(Color::Green)),
            Span::raw(format!(" {:>3}%", percent)),
        ]));
    }

    if let Some(ref source_url) = row.source_url {
        lines.push(Line::from(Span::styled(
            format!("  {}", source_url),
            Style::default().fg(Color::DarkGray),
        )));
    }

    ListItem::new(lines)
}
