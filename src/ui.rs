//! The UI renders the application state: a section sidebar beside the scrolling document.
//!
//! The sidebar groups sections under their view. The section the coordinator reports as
//! active is drawn in green with a bullet, and the cursor row is reversed. The document pane
//! marks the activation line in its gutter so the scroll-spy decisions can be followed, and
//! a failed view switch is reported in the help bar while the previous document stays up.

use crate::app_state::AppState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 32;

/// Renders the sidebar, document pane and help bar.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[0]);

    draw_sidebar(f, app, columns[0]);
    draw_document(f, app, columns[1]);
    draw_help(f, app, rows[1]);
}

fn draw_sidebar(f: &mut Frame, app: &AppState, area: Rect) {
    let mut items = Vec::with_capacity(app.nav.len() * 2);
    let mut current_view = None;

    for (i, entry) in app.nav.iter().enumerate() {
        if current_view != Some(&entry.view) {
            current_view = Some(&entry.view);
            items.push(ListItem::new(Line::from(Span::styled(
                entry.view.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))));
        }

        let active = app.is_active(entry);
        let indent = "  ".repeat(entry.level);
        let marker = if active { "● " } else { "  " };
        let mut style = if active {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if i == app.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        items.push(ListItem::new(Line::from(format!("{indent}{marker}{}", entry.title))).style(style));
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Sections"));
    f.render_widget(list, area);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_document(f: &mut Frame, app: &mut AppState, area: Rect) {
    let title = match app.page.loading() {
        Some(load) => load.view.to_string(),
        None => {
            let doc = app.page.mounted();
            format!("{} ({})", doc.view, doc.path.display())
        }
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.page.set_viewport_rows(usize::from(inner.height));

    let text: Vec<Line> = match app.page.loading() {
        Some(load) => vec![Line::from(Span::styled(
            format!("Loading {}...", load.view),
            Style::default().fg(Color::Yellow),
        ))],
        None => {
            let doc = app.page.mounted();
            let top = app.page.top_row();
            let activation_row =
                (app.spy.config().anchor_offset / app.page.row_height()).round().max(0.0) as usize;
            let heading_rows: Vec<usize> = doc.headings.iter().map(|h| h.line_start).collect();

            doc.lines
                .iter()
                .enumerate()
                .skip(top)
                .take(usize::from(inner.height))
                .map(|(row, line)| {
                    let gutter = if row - top == activation_row { "▸ " } else { "  " };
                    let style = if heading_rows.contains(&row) {
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Line::from(vec![
                        Span::styled(gutter, Style::default().fg(Color::DarkGray)),
                        Span::styled(line.clone(), style),
                    ])
                })
                .collect()
        }
    };

    let alignment = if app.page.loading().is_none() {
        Alignment::Left
    } else {
        Alignment::Center
    };
    f.render_widget(Paragraph::new(text).alignment(alignment), inner);
}

fn draw_help(f: &mut Frame, app: &AppState, area: Rect) {
    let help = app.message.clone().unwrap_or_else(|| {
        format!(
            "{} | ↑/↓: Scroll | Tab: Select | Enter/1-9: Go | q: Quit",
            app.status_line()
        )
    });
    let help_widget = Paragraph::new(help).block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, area);
}
