//! Rendering for the list panel, the forms, and the status bar.

use crate::app::{App, Focus};
use crate::forms::{AddFeedForm, EditFeedForm};
use crate::registry::Mode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::borrow::Cow;
use unicode_width::UnicodeWidthChar;

/// Minimum terminal dimensions required for normal operation.
const MIN_WIDTH: u16 = 50;
const MIN_HEIGHT: u16 = 8;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new(format!(
            "Terminal too small\nMinimum: {}x{}",
            MIN_WIDTH, MIN_HEIGHT
        ))
        .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    render_feed_list(f, app, panels[0]);
    match app.list.mode() {
        Mode::Idle => render_idle_panel(f, panels[1]),
        Mode::Adding => render_add_form(f, app, &app.add_form, panels[1]),
        Mode::Editing => render_edit_form(f, app, &app.edit_form, panels[1]),
    }
    render_status(f, app, rows[1]);
}

fn render_feed_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .list
        .feeds()
        .iter()
        .map(|feed| {
            let mut spans = vec![Span::raw(feed.name.clone())];
            if feed.marked_for_deletion {
                spans.push(Span::styled(
                    "  [deletion pending]",
                    Style::default().fg(Color::Red),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let highlight = if app.focus == Focus::List {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Feeds ({}) ", app.list.len())),
        )
        .highlight_style(highlight)
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(if app.list.is_empty() {
        None
    } else {
        Some(app.cursor)
    });
    f.render_stateful_widget(list, area, &mut state);
}

fn render_idle_panel(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "\n  [a] add feed\n  [Enter] edit selected\n  [d] mark for deletion\n  [r] reload\n  [q] quit",
    )
    .block(Block::default().borders(Borders::ALL).title(" feedctl "));
    f.render_widget(help, area);
}

fn render_add_form(f: &mut Frame, app: &App, form: &AddFeedForm, area: Rect) {
    let width = field_width(area);
    let lines = vec![
        Line::raw(""),
        text_field("Name", &form.name, app.field == 0 && app.focus == Focus::Form, width),
        text_field("URL", &form.url, app.field == 1 && app.focus == Focus::Form, width),
        Line::raw(""),
        form_status(form.in_flight(), form.success(), form.error()),
    ];

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Add feed "));
    f.render_widget(panel, area);
}

fn render_edit_form(f: &mut Frame, app: &App, form: &EditFeedForm, area: Rect) {
    let width = field_width(area);
    let focused = |i: usize| app.field == i && app.focus == Focus::Form;
    let title = match form.target() {
        Some(name) => format!(" Edit {} ", name),
        None => " Edit ".to_string(),
    };

    let flag = if form.marked_for_deletion { "[x]" } else { "[ ]" };
    let flag_style = if focused(2) {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
    } else {
        Style::default()
    };

    let lines = vec![
        Line::raw(""),
        text_field("URL", &form.url, focused(0), width),
        text_field("Content type", &form.content_type, focused(1), width),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{} marked for deletion", flag), flag_style),
        ]),
        Line::raw(""),
        form_status(form.in_flight(), form.success(), form.error()),
    ];

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(panel, area);
}

/// One labeled input line; the active field gets a block cursor.
fn text_field(label: &str, value: &str, active: bool, width: usize) -> Line<'static> {
    let label_style = if active {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::styled(format!("{:<14}", label), label_style),
        Span::raw(tail_fit(value, width).to_string()),
    ];
    if active {
        spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
    }
    Line::from(spans)
}

/// Per-form status line: in-flight beats success beats error beats nothing.
fn form_status(in_flight: bool, success: bool, error: Option<&str>) -> Line<'static> {
    let (text, style): (Cow<'_, str>, Style) = if in_flight {
        (Cow::Borrowed("  Saving..."), Style::default().fg(Color::Yellow))
    } else if let Some(msg) = error {
        (
            Cow::Owned(format!("  Error: {}", msg)),
            Style::default().fg(Color::Red),
        )
    } else if success {
        (Cow::Borrowed("  Saved."), Style::default().fg(Color::Green))
    } else {
        (Cow::Borrowed(""), Style::default())
    };
    Line::from(Span::styled(text.into_owned(), style))
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if app.loading {
        Cow::Borrowed("Loading feeds...")
    } else if let Some(err) = &app.list_error {
        Cow::Owned(format!("Error: {}", err))
    } else {
        match app.focus {
            Focus::List => {
                Cow::Borrowed("[a]dd [Enter]edit [d]elete [r]eload [j/k]move [q]uit")
            }
            Focus::Form => Cow::Borrowed("[Tab]next field [Enter]save [Esc]cancel"),
        }
    };

    let style = if app.list_error.is_some() && !app.loading {
        Style::default().bg(Color::DarkGray).fg(Color::Red)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Display width available for a field value inside the form panel.
fn field_width(area: Rect) -> usize {
    // Borders, leading indent, label column, cursor cell.
    (area.width as usize).saturating_sub(2 + 2 + 14 + 1)
}

/// Longest suffix of `value` that fits in `max_width` display columns, so
/// the end of a long URL stays visible while typing.
fn tail_fit(value: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = value.len();
    for (idx, ch) in value.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    &value[start..]
}
