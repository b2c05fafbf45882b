//! UI rendering components

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use super::app::{App, FetchState};
use super::input::InputMode;
use super::rows;

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query form
            Constraint::Min(0),    // Credential rows
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_form(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

/// Render the query form: text input plus the Find button
fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(10)])
        .split(area);

    let editing = app.input_mode() == InputMode::Query;

    let (input_text, input_style) = if app.query().is_empty() {
        (
            "Enter a password...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        (app.query(), Style::default().fg(Color::White))
    };

    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(input_text).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Query ")
            .border_style(border_style),
    );
    frame.render_widget(input, chunks[0]);

    let button_style = if editing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let button = Paragraph::new("Find")
        .alignment(Alignment::Center)
        .style(button_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, chunks[1]);

    if editing {
        frame.set_cursor_position((chunks[0].x + app.query().len() as u16 + 1, chunks[0].y + 1));
    }
}

/// Render the credential rows with the configured strategy
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.layout {
        rows::Layout::List => render_list(frame, app, area),
        rows::Layout::Grid => render_grid(frame, app, area),
    }
}

/// Render the flat list: one line per credential in snapshot order
fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.snapshot();
    if snapshot.is_empty() {
        render_empty(frame, app, area);
        return;
    }

    let lines: Vec<Line> = rows::snapshot_rows(snapshot)
        .iter()
        .map(|row| Line::from(rows::list_line(row)))
        .collect();

    let list = Paragraph::new(lines)
        .scroll((app.scroll() as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Credentials ({}) ", snapshot.len()))
                .title_bottom(" Tab: Navigate │ Enter: Find "),
        );
    frame.render_widget(list, area);
}

/// Render the paginated grid with its inert checkbox column
fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.snapshot();
    if snapshot.is_empty() {
        render_empty(frame, app, area);
        return;
    }

    let header = Row::new(vec!["", "Name"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table_rows: Vec<Row> = rows::page_rows(snapshot, app.page())
        .iter()
        .map(|row| {
            let checkbox = if app.is_selected(&row.id) { "[x]" } else { "[ ]" };
            Row::new(vec![checkbox.to_string(), row.name.clone()])
        })
        .collect();

    let title = format!(
        " Credentials ({}) Page {}/{} ",
        snapshot.len(),
        app.page() + 1,
        rows::page_count(snapshot.len()),
    );

    let table = Table::new(table_rows, [Constraint::Length(3), Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(" ←→ Page │ Space: Select │ y: Yank │ Tab: Query "),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(50, 50, 80))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default();
    table_state.select(Some(app.cursor()));

    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Render the empty-snapshot placeholder
fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let hint = match app.state() {
        FetchState::Idle => "Press Enter to fetch credentials",
        FetchState::Loading => "Loading...",
        FetchState::Ready | FetchState::Error => "No credentials in the vault",
    };

    let empty = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Credentials "),
        );
    frame.render_widget(empty, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state_indicator = match app.state() {
        FetchState::Idle => Span::styled(" ● Idle ", Style::default().fg(Color::DarkGray)),
        FetchState::Loading => Span::styled(" ● Loading ", Style::default().fg(Color::Yellow)),
        FetchState::Ready => Span::styled(" ● Ready ", Style::default().fg(Color::Green)),
        FetchState::Error => Span::styled(" ● Error ", Style::default().fg(Color::Red)),
    };

    let mut spans = vec![
        state_indicator,
        Span::raw(format!("│ {} ", app.daemon_url)),
    ];

    if let Some(error) = app.error() {
        spans.push(Span::styled(
            format!("│ {} ", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(notice) = app.notice() {
        spans.push(Span::styled(
            format!("│ {} ", notice),
            Style::default().fg(Color::Cyan),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
