//! UI rendering

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use svault_core::{FormState, MASK, ModalKind};

use crate::tui::app::{App, DialogField, Popup};

/// Color palette that respects --no-color flag
struct Colors;

impl Colors {
    fn pick(color: Color) -> Color {
        if console::colors_enabled() {
            color
        } else {
            Color::Reset
        }
    }

    fn cyan() -> Color {
        Self::pick(Color::Cyan)
    }

    fn yellow() -> Color {
        Self::pick(Color::Yellow)
    }

    fn green() -> Color {
        Self::pick(Color::Green)
    }

    fn red() -> Color {
        Self::pick(Color::Red)
    }

    fn dark_gray() -> Color {
        Self::pick(Color::DarkGray)
    }

    fn white() -> Color {
        Self::pick(Color::White)
    }
}

/// Render the entire UI
pub fn render(app: &mut App, frame: &mut Frame) {
    let error_height = if app.state.error.is_clean() { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Header
            Constraint::Length(error_height), // Error banner
            Constraint::Min(0),               // Secrets
            Constraint::Length(3),            // Status bar
            Constraint::Length(1),            // Keybindings
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    if let Some(error) = app.state.error.message() {
        render_error_banner(frame, chunks[1], error);
    }
    render_secrets(app, frame, chunks[2]);
    render_status(app, frame, chunks[3]);
    render_keybindings(app, frame, chunks[4]);

    if let Some(form) = app.state.modal.form() {
        render_dialog(app, frame, form);
    }

    match &app.popup {
        Popup::Help => render_help_popup(frame),
        Popup::ConfirmDelete { name, .. } => render_confirm_delete(frame, name),
        Popup::None => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = format!(
        " svault - Secrets Vault │ {} secrets ",
        app.state.store.len()
    );

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Colors::cyan())
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(error)
        .style(Style::default().fg(Colors::red()))
        .block(
            Block::default()
                .title(" Error (any key or Ctrl-x to dismiss) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Colors::red())),
        );

    frame.render_widget(banner, area);
}

fn render_secrets(app: &mut App, frame: &mut Frame, area: Rect) {
    app.secrets_area = area;

    let title = if app.searching {
        format!(" Secrets (/{}) ", app.search_filter)
    } else if !app.search_filter.is_empty() {
        format!(" Secrets [filtered: {}] ", app.search_filter)
    } else {
        " Secrets ".to_string()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Colors::cyan()));

    let store = &app.state.store;
    if !store.is_loaded() {
        let text = if store.is_loading() {
            "Loading secrets..."
        } else {
            "Secrets could not be loaded. Press r to retry."
        };
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Colors::yellow()))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }
    if store.is_empty() {
        let placeholder = Paragraph::new("No secrets yet. Press n to create your first one.")
            .style(Style::default().fg(Colors::dark_gray()))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let filtered = app.filtered_secrets();
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|secret| {
            let keys = match secret.key_count() {
                1 => "1 key".to_string(),
                n => format!("{} keys", n),
            };
            let line = Line::from(vec![
                Span::raw(format!("{:<30}", secret.name)),
                Span::styled(format!("{:<10}", keys), Style::default().fg(Colors::cyan())),
                Span::styled(
                    format!("{:<18}", secret.created_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Colors::dark_gray()),
                ),
                Span::raw(secret.description().unwrap_or("").to_string()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Colors::dark_gray()),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !filtered.is_empty() {
        state.select(Some(app.secret_index.min(filtered.len() - 1)));
    }

    frame.render_stateful_widget(list, area, &mut state);

    // Save scroll offset for mouse click handling
    app.secrets_scroll_offset = state.offset();
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let total = app.state.store.len();
    let filtered = app.filtered_secrets().len();

    let mut status_parts = Vec::new();

    if let Some(ref msg) = app.status_message {
        status_parts.push(Span::styled(
            format!("{} │ ", msg),
            Style::default()
                .fg(Colors::green())
                .add_modifier(Modifier::BOLD),
        ));
    }

    let main_status = if app.state.store.is_loading() {
        format!("Refreshing... | Total: {}", total)
    } else if filtered != total {
        format!("Showing: {} of {}", filtered, total)
    } else {
        format!("Total: {}", total)
    };
    status_parts.push(Span::raw(main_status));

    let status_bar = Paragraph::new(Line::from(status_parts))
        .style(Style::default().fg(Colors::white()))
        .block(Block::default().borders(Borders::ALL).title(" Status "));

    frame.render_widget(status_bar, area);
}

fn key_hint(key: &str, label: &str) -> [Span<'static>; 2] {
    [
        Span::styled(key.to_string(), Style::default().fg(Colors::yellow())),
        Span::raw(format!(" {}  ", label)),
    ]
}

fn render_keybindings(app: &App, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = if app.state.modal.is_open() {
        &[
            (" Tab", "Next field"),
            ("Enter", "Add pair / Save"),
            ("Ctrl-s", "Save"),
            ("Del", "Remove pair"),
            ("Esc", "Cancel"),
        ]
    } else {
        &[
            (" q", "Quit"),
            ("j/k", "Nav"),
            ("n", "New"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("r", "Refresh"),
            ("/", "Search"),
            ("?", "Help"),
        ]
    };
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, label)| key_hint(key, label))
        .collect();

    let keybindings =
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Colors::dark_gray()));

    frame.render_widget(keybindings, area);
}

/// Single-line input, with a block cursor when focused
fn input_line(text: &str, cursor: usize, focused: bool, masked: bool) -> Line<'static> {
    let shown: String = if masked {
        "•".repeat(text.chars().count())
    } else {
        text.to_string()
    };
    if !focused {
        return Line::from(vec![Span::raw(format!("  {}", shown))]);
    }

    // UTF-8 safe using char indices
    let cursor_pos = cursor.min(shown.chars().count());
    let before: String = shown.chars().take(cursor_pos).collect();
    let cursor_char = shown.chars().nth(cursor_pos).unwrap_or(' ');
    let after_cursor: String = shown.chars().skip(cursor_pos + 1).collect();
    Line::from(vec![
        Span::raw("  "),
        Span::raw(before),
        Span::styled(
            cursor_char.to_string(),
            Style::default().bg(Colors::white()).fg(Color::Black),
        ),
        Span::raw(after_cursor),
    ])
}

fn label(text: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Colors::cyan())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Colors::dark_gray())
    };
    Line::from(vec![Span::styled(format!("  {}", text), style)])
}

fn render_dialog(app: &App, frame: &mut Frame, form: &FormState) {
    let area = centered_rect(70, 80, frame.area());
    let title = match app.state.modal.kind() {
        ModalKind::Edit => " Edit Secret ",
        _ => " New Secret ",
    };
    let field = app.field;

    let mut lines = vec![
        Line::from(""),
        label("Name:", field == DialogField::Name),
        input_line(&form.name, app.cursor, field == DialogField::Name, false),
        label("Description:", field == DialogField::Description),
        input_line(
            &form.description,
            app.cursor,
            field == DialogField::Description,
            false,
        ),
        Line::from(""),
        label("Key:", field == DialogField::Key),
        input_line(
            &form.editor.pending.key,
            app.cursor,
            field == DialogField::Key,
            false,
        ),
        label("Value:", field == DialogField::Value),
        input_line(
            &form.editor.pending.value,
            app.cursor,
            field == DialogField::Value,
            true,
        ),
        Line::from(""),
        label(
            &format!("Entries ({}):", form.editor.len()),
            field == DialogField::Entries,
        ),
    ];

    if form.editor.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No key/value pairs yet",
            Style::default().fg(Colors::dark_gray()),
        )));
    }
    for (index, (key, value)) in form.editor.masked_entries().enumerate() {
        let selected = field == DialogField::Entries && index == app.entry_index;
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Colors::yellow())
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}{:<24}", marker, key), style),
            Span::styled(value, Style::default().fg(Colors::green())),
        ]));
    }

    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Colors::cyan())),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(50, 80, frame.area());

    let section = |title: &str| {
        Line::from(vec![Span::styled(
            title.to_string(),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Colors::cyan()),
        )])
    };
    let binding = |key: &str, text: &str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(Colors::yellow())),
            Span::raw(text.to_string()),
        ])
    };

    let help_text = vec![
        section("Navigation"),
        binding("j/↓", "Move down"),
        binding("k/↑", "Move up"),
        binding("g / G", "Go to top / bottom"),
        binding("/", "Filter by name"),
        Line::from(""),
        section("Secrets"),
        binding("n", "New secret"),
        binding("e/Enter", "Edit secret"),
        binding("d", "Delete secret"),
        binding("r", "Refresh list"),
        Line::from(""),
        section("Dialog"),
        binding("Tab", "Next field"),
        binding("Enter", "Add pair (key/value) or save"),
        binding("Ctrl-s", "Save"),
        binding("Del", "Remove selected pair"),
        binding("Esc", "Cancel"),
        Line::from(""),
        section("General"),
        binding("Ctrl-x", "Dismiss error"),
        binding("q", "Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("  Values are always shown as {}", MASK),
            Style::default().fg(Colors::dark_gray()),
        )]),
        Line::from(vec![Span::styled(
            "       Press any key to close",
            Style::default().fg(Colors::dark_gray()),
        )]),
    ];

    let help_block = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Colors::cyan())),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(help_block, area);
}

fn render_confirm_delete(frame: &mut Frame, name: &str) {
    let area = centered_rect(50, 25, frame.area());

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Delete secret "),
            Span::styled(
                name.to_string(),
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Colors::yellow()),
            ),
            Span::raw("?"),
        ]),
        Line::from(""),
        Line::from("  This cannot be undone."),
        Line::from(""),
        Line::from(vec![
            Span::raw("  Press "),
            Span::styled(
                "y",
                Style::default()
                    .fg(Colors::green())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to confirm, "),
            Span::styled(
                "n",
                Style::default()
                    .fg(Colors::red())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" or "),
            Span::styled(
                "Esc",
                Style::default()
                    .fg(Colors::red())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to cancel"),
        ]),
    ];

    let confirm_block = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Colors::red())),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(confirm_block, area);
}

/// Helper to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
