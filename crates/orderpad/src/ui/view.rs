//! Rendering for the form screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_input::Input;

use super::app::{App, FormField, Mode, StatusKind};

/// Draw the whole screen.
pub(crate) fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // customer name
            Constraint::Length(3), // address
            Constraint::Length(3), // order
            Constraint::Length(1), // status line
            Constraint::Min(1),    // order list
            Constraint::Length(1), // help footer
        ])
        .split(f.area());

    draw_input(f, chunks[0], app, FormField::Name, " Customer ", &app.name_input);
    draw_input(f, chunks[1], app, FormField::Address, " Address ", &app.address_input);
    draw_input(f, chunks[2], app, FormField::Details, " Order ", &app.details_input);
    draw_status(f, chunks[3], app);
    draw_orders(f, chunks[4], app);
    draw_help(f, chunks[5], app);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App, field: FormField, title: &str, input: &Input) {
    let focused = app.mode == Mode::Form && app.focus == field;
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let width = area.width.max(3) - 3;
    let scroll = input.visual_scroll(width as usize);
    let widget = Paragraph::new(input.value())
        .style(style)
        .scroll((0, u16::try_from(scroll).unwrap_or(0)))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);

    // Cursor follows the focused input
    if focused {
        let cursor = input.visual_cursor().max(scroll) - scroll;
        f.set_cursor_position((area.x + u16::try_from(cursor).unwrap_or(0) + 1, area.y + 1));
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let Some(status) = &app.status else {
        return;
    };

    let style = match status.kind {
        StatusKind::Info => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    f.render_widget(Paragraph::new(status.text.as_str()).style(style), area);
}

fn draw_orders(f: &mut Frame, area: Rect, app: &App) {
    let records = app.book.records();

    let block = Block::default()
        .title(format!(" Orders ({}) ", records.len()))
        .borders(Borders::ALL)
        .border_style(if app.mode == Mode::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        });

    let items: Vec<ListItem> = records
        .iter()
        .map(|record| {
            let content = vec![
                Line::from(vec![
                    Span::raw("Name:    "),
                    Span::styled(
                        record.customer_name.as_str(),
                        Style::default().fg(Color::Yellow),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("Address: "),
                    Span::raw(record.customer_address.as_str()),
                ]),
                Line::from(vec![
                    Span::raw("Order:   "),
                    Span::raw(record.order_details.as_str()),
                ]),
                Line::from(Span::raw("")),
            ];
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if app.mode == Mode::List && !records.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.mode {
        Mode::Form => "Tab next field · Enter add · Esc list · Ctrl-C quit",
        Mode::List => "↑/↓ select · Shift-↑/↓ move · d done · Del delete · Esc form · q quit",
    };
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}
