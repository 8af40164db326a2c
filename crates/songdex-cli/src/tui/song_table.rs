use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use super::App;

/// Rows moved by PageUp/PageDown.
pub const PAGE_SIZE: isize = 20;

/// Render the search screen.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(5),    // Song table
            Constraint::Length(3), // Status + help
        ])
        .split(area);

    render_input(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.input_enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(format!("{}\u{2588}", app.input))
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(input, area);
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Date").style(Style::default().fg(Color::DarkGray)),
        Cell::from("Title & Artist").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Song Code"),
    ])
    .height(1);

    // area.height - 2 for borders - 1 for header
    let viewport_height = area.height.saturating_sub(3) as usize;
    app.scroll_into_view(viewport_height);

    let songs = app.results.as_ref().map(|r| r.rows()).unwrap_or_default();

    let rows: Vec<Row> = if songs.is_empty() && app.results.is_some() {
        vec![Row::new(vec![Cell::from(""), Cell::from("No songs found."), Cell::from("")])]
    } else {
        songs
            .iter()
            .enumerate()
            .skip(app.offset)
            .take(viewport_height)
            .map(|(i, song)| {
                let style = if i == app.selected {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(song.date_string().to_string()),
                    Cell::from(song.title_and_artist().to_string()),
                    Cell::from(song.song_code().to_string()).style(Style::default().fg(Color::Yellow)),
                ])
                .style(style)
            })
            .collect()
    };

    let title = match &app.results {
        Some(results) if results.displayed() > viewport_height => format!(
            "Songs [{}-{} of {}]",
            app.offset + 1,
            (app.offset + viewport_height).min(results.displayed()),
            results.displayed()
        ),
        Some(results) if !results.term().trim().is_empty() => {
            format!("Songs matching \"{}\"", results.term().trim())
        }
        _ => "Songs".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Percentage(70),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let status_style = if app.status_is_error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let line = Line::from(vec![
        Span::styled(app.status.clone(), status_style),
        Span::styled(
            "    \u{2191}/\u{2193} Move  Enter Open  Ctrl-Y Copy code  Esc Quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
