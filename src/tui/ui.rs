use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::{App, Mode, Row};
use crate::html::NO_RESULTS_MESSAGE;
use crate::view::CardView;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Category tabs
            Constraint::Length(1), // Filters
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // A-Z bar
            Constraint::Length(1), // Footer/search
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_tabs(f, chunks[1], app);
    draw_filters(f, chunks[2], app);
    draw_main(f, chunks[3], app);
    draw_az_bar(f, chunks[4], app);
    draw_footer(f, chunks[5], app);

    if app.show_help {
        draw_help_popup(f, app.help_scroll);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let counter = if app.load_error.is_some() {
        String::new()
    } else {
        app.view.counter.clone()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Directory",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(counter, Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(header, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    if app.load_error.is_some() {
        return;
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.view.tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }
        let style = if tab.active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if tab.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{} ({})", tab.label, tab.count), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let label = Style::default().fg(Color::DarkGray);
    let value = |v: Option<&str>| match v {
        Some(v) => Span::styled(v.to_string(), Style::default().fg(Color::Green)),
        None => Span::raw("any"),
    };
    let owner = app.owner_label();
    let owner = if state.owner.is_some() {
        Span::styled(owner, Style::default().fg(Color::Green))
    } else {
        Span::raw(owner)
    };

    let line = Line::from(vec![
        Span::styled(" Sector: ", label),
        value(state.sector.as_deref()),
        Span::styled("  Country: ", label),
        value(state.country.as_deref()),
        Span::styled("  Owner: ", label),
        owner,
        Span::styled("  Domain: ", label),
        value(state.domain.as_deref()),
        Span::styled("  Sort: ", label),
        Span::styled(state.sort.label(), Style::default().fg(Color::Yellow)),
    ]);
    let line = if state.is_filtered() {
        let mut spans = line.spans;
        spans.push(Span::styled("  (r to reset)", label));
        Line::from(spans)
    } else {
        line
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_list(f, chunks[0], app);
    draw_detail(f, chunks[1], app);
}

fn draw_list(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Items ");

    if let Some(error) = &app.load_error {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )))
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    if app.view.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            NO_RESULTS_MESSAGE,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let cards: Vec<&CardView> = app.view.cards().collect();
    let items: Vec<ListItem> = app
        .rows()
        .iter()
        .map(|row| match row {
            Row::Group { category, count } => ListItem::new(Line::from(vec![
                Span::styled(
                    category.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" ({})", count), Style::default().fg(Color::DarkGray)),
            ])),
            Row::Section { heading, popular } => {
                let text = if *popular {
                    format!("  ★ {}", heading)
                } else {
                    format!("  {}", heading)
                };
                let color = if *popular { Color::Yellow } else { Color::DarkGray };
                ListItem::new(text).style(Style::default().fg(color).add_modifier(Modifier::ITALIC))
            }
            Row::Card(position) => card_item(cards[*position], width),
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn card_item(card: &CardView, width: usize) -> ListItem<'static> {
    let mut spans = vec![Span::raw("    ")];
    if card.verified {
        spans.push(Span::raw(truncate(&card.name, width.saturating_sub(6))));
        spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
    } else {
        spans.push(Span::styled(
            truncate(&card.name, width.saturating_sub(6)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let style = if card.inactive {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(spans)).style(style)
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Details ");

    let Some(card) = app.current_card() else {
        f.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled(
        card.name.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];

    let link = if card.verified {
        Span::styled(card.href.clone(), Style::default().fg(Color::Cyan))
    } else {
        Span::styled("(no usable link)", Style::default().fg(Color::Red))
    };
    lines.push(Line::from(vec![Span::styled("Link: ", label), link]));
    lines.push(Line::from(""));

    if let Some(description) = &card.description {
        let wrap_width = area.width.saturating_sub(4).max(10) as usize;
        for line in textwrap::wrap(description, wrap_width) {
            lines.push(Line::from(line.into_owned()));
        }
        lines.push(Line::from(""));
    }

    let tags = card.tags();
    if !tags.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Tags: ", label),
            Span::styled(tags.join(", "), Style::default().fg(Color::Green)),
        ]));
    }
    if card.inactive {
        lines.push(Line::from(Span::styled(
            "Inactive",
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_az_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(" ")];
    for letter in &app.view.letters {
        let style = if letter.has_items {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{} ", letter.letter), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = &app.status_message {
        let content = Line::from(vec![
            Span::raw(" "),
            Span::styled(status.as_str(), Style::default().fg(Color::Green)),
        ]);
        f.render_widget(Paragraph::new(content), area);
        return;
    }

    match app.mode {
        Mode::Normal => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(10)])
                .split(area);

            let key = Style::default().fg(Color::Yellow);
            let left_content = Line::from(vec![
                Span::styled(" q ", key),
                Span::raw("quit  "),
                Span::styled(" ↑/↓ ", key),
                Span::raw("nav  "),
                Span::styled(" [/] ", key),
                Span::raw("tabs  "),
                Span::styled(" / ", key),
                Span::raw("search  "),
                Span::styled(" s ", key),
                Span::raw("sort  "),
                Span::styled(" 1-4 ", key),
                Span::raw("filters  "),
                Span::styled(" o ", key),
                Span::raw("open"),
            ]);
            let right_content = Line::from(vec![Span::styled(" ? ", key), Span::raw("help ")]);

            f.render_widget(Paragraph::new(left_content), chunks[0]);
            f.render_widget(
                Paragraph::new(right_content).alignment(Alignment::Right),
                chunks[1],
            );
        }
        Mode::Search => {
            let content = Line::from(vec![
                Span::styled(" Search: ", Style::default().fg(Color::Cyan)),
                Span::raw(app.state.query.as_str()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
                Span::raw("  "),
                Span::styled(" Enter/Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("confirm"),
            ]);
            let content = if app.search_debounce.is_pending() {
                let mut spans = content.spans;
                spans.push(Span::styled("  …", Style::default().fg(Color::DarkGray)));
                Line::from(spans)
            } else {
                content
            };
            f.render_widget(Paragraph::new(content), area);
        }
        Mode::Jump => {
            let content = Line::from(vec![
                Span::styled(" Jump to letter: ", Style::default().fg(Color::Cyan)),
                Span::styled("A-Z or #", Style::default().fg(Color::Yellow)),
                Span::raw("  any other key cancels"),
            ]);
            f.render_widget(Paragraph::new(content), area);
        }
    }
}

/// Truncate to a display width, appending "..." when shortened.
fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

fn help_section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn help_key(key: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", key), Style::default().fg(Color::Yellow)),
        Span::raw(action.to_string()),
    ])
}

fn draw_help_popup(f: &mut Frame, scroll: u16) {
    let area = centered_rect(50, 70, f.area());

    // Clear the area behind the popup
    f.render_widget(Clear, area);

    let help_text = vec![
        help_section("Navigation"),
        help_key("j/↓", "Move down"),
        help_key("k/↑", "Move up"),
        help_key("g", "First item"),
        help_key("G", "Last item"),
        help_key("Ctrl+d/PgDn", "Page down"),
        help_key("Ctrl+u/PgUp", "Page up"),
        help_key("f + letter", "Jump to first item starting with letter"),
        Line::from(""),
        help_section("Categories"),
        help_key("[ / ]", "Previous / next category tab"),
        Line::from(""),
        help_section("Search"),
        help_key("/", "Start search"),
        help_key("Enter/Esc", "Exit search mode"),
        help_key("Esc", "Clear search (in normal mode)"),
        Line::from(""),
        help_section("Filters & Sort"),
        help_key("s", "Cycle sort (name ↑ → name ↓ → country → domain)"),
        help_key("1", "Cycle sector"),
        help_key("2", "Cycle country"),
        help_key("3", "Cycle owner"),
        help_key("4", "Cycle domain"),
        help_key("r", "Reset all filters"),
        Line::from(""),
        help_section("Links"),
        help_key("o/Enter", "Open link in browser"),
        help_key("c", "Copy link"),
        Line::from(""),
        help_section("Other"),
        help_key("q", "Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Help - press ? or Esc to close (j/k to scroll) ");

    let paragraph = Paragraph::new(help_text).block(block).scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

/// Create a centered rect using percentage of the available area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
