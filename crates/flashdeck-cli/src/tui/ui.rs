//! UI rendering

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, ListState,
        Paragraph, Tabs, Wrap,
    },
    Frame,
};

use flashdeck_core::theme::Rgb;
use flashdeck_core::{Rating, ReviewPhase, ReviewState, Statistics};

use super::app::{App, CardTab, Screen};
use crate::output::{due_label, NO_CARDS_DUE};

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, outer_chunks[0]);
    match app.screen {
        Screen::Cards => draw_cards_screen(frame, app, outer_chunks[1]),
        Screen::Review => draw_review_screen(frame, app, outer_chunks[1]),
        Screen::Statistics => draw_statistics_screen(frame, app, outer_chunks[1]),
    }
    draw_status_bar(frame, app, outer_chunks[2]);

    if app.show_help {
        draw_help_overlay(frame);
    }
    if let Some(ref error) = app.error {
        draw_error_modal(frame, app, error);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let primary = Style::default()
        .fg(color(app.palette.primary))
        .add_modifier(Modifier::BOLD);

    let title = match app.screen {
        Screen::Cards => {
            let titles = vec![
                format!(" Due ({}) ", app.due.cards.len()),
                format!(" All ({}) ", app.all.cards.len()),
            ];
            let tabs = Tabs::new(titles)
                .select(app.tab.index())
                .highlight_style(primary.add_modifier(Modifier::REVERSED))
                .divider("|");
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(12), Constraint::Min(10)])
                .split(area);
            frame.render_widget(Paragraph::new(Span::styled(" flashdeck ", primary)), chunks[0]);
            frame.render_widget(tabs, chunks[1]);
            return;
        }
        Screen::Review => " flashdeck · Review ",
        Screen::Statistics => " flashdeck · Statistics ",
    };
    frame.render_widget(Paragraph::new(Span::styled(title, primary)), area);
}

fn draw_cards_screen(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_card_list(frame, app, chunks[0]);
    draw_card_detail(frame, app, chunks[1]);
}

fn draw_card_list(frame: &mut Frame, app: &App, area: Rect) {
    let list = app.current_list();
    let title = match (app.tab, list.refreshing) {
        (CardTab::Due, false) => " Due for review ".to_string(),
        (CardTab::All, false) => " All cards ".to_string(),
        (CardTab::Due, true) => " Due for review (refreshing) ".to_string(),
        (CardTab::All, true) => " All cards (refreshing) ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let placeholder = if list.loading {
        Some("Loading...".to_string())
    } else if let Some(ref error) = list.error {
        if list.cards.is_empty() {
            Some(format!("Could not load cards: {}", error))
        } else {
            None
        }
    } else if list.is_empty() {
        Some(match app.tab {
            CardTab::Due => format!("{}\n\nTab: browse all cards", NO_CARDS_DUE),
            CardTab::All => "No cards yet. Add one with `flashdeck cards add`.".to_string(),
        })
    } else {
        None
    };

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(color(app.palette.muted)));
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = list
        .cards
        .iter()
        .map(|card| {
            let due_style = if card.is_due(now) {
                Style::default().fg(color(app.palette.primary))
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<20} ", card.word)),
                Span::styled(due_label(card.next_review, now), due_style),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

    let mut state = ListState::default();
    state.select(Some(app.card_index));

    frame.render_stateful_widget(list_widget, area, &mut state);
}

fn draw_card_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Card ").borders(Borders::ALL);

    let Some(card) = app.selected_card() else {
        frame.render_widget(block, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let label = Style::default().add_modifier(Modifier::DIM);
    let mut lines = vec![
        Line::from(Span::styled(
            card.word.clone(),
            Style::default()
                .fg(color(app.palette.primary))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(card.definition.clone()),
    ];
    if let Some(example) = card.example_text() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Example: ", label),
            Span::styled(example.to_string(), Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    if let Some(notes) = card.notes_text() {
        lines.push(Line::from(vec![
            Span::styled("Notes:   ", label),
            Span::raw(notes.to_string()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Status:  ", label),
        Span::raw(card.status.as_str()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Next:    ", label),
        Span::raw(due_label(card.next_review, Utc::now())),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color(app.palette.primary)))
        .ratio(card.progress())
        .label(format!("{} reviews", card.review_count));
    frame.render_widget(gauge, chunks[1]);
}

fn draw_review_screen(frame: &mut Frame, app: &App, area: Rect) {
    let card_area = centered(area, 70, 16);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(app.palette.primary)));

    let Some(ref state) = app.review else {
        frame.render_widget(block, card_area);
        return;
    };

    let lines = review_lines(app, state);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, card_area);
}

fn review_lines(app: &App, state: &ReviewState) -> Vec<Line<'static>> {
    let muted = Style::default().fg(color(app.palette.muted));
    let word_style = Style::default()
        .fg(color(app.palette.primary))
        .add_modifier(Modifier::BOLD);

    let card = match (state.phase, &state.card) {
        (ReviewPhase::Loading, _) | (_, None) => {
            return vec![Line::from(""), Line::styled("Loading card...", muted)]
        }
        (ReviewPhase::NotFound, _) => return vec![Line::from("Card not found")],
        (_, Some(card)) => card,
    };

    if state.flipping {
        return vec![Line::from(""), Line::styled("· · ·", muted)];
    }

    let mut lines = vec![
        Line::from(""),
        Line::styled(card.word.clone(), word_style),
        Line::from(""),
    ];

    if !state.is_revealed() && state.phase != ReviewPhase::Done {
        lines.push(Line::styled("Space: show answer", muted));
        return lines;
    }

    lines.push(Line::from(card.definition.clone()));
    if let Some(example) = card.example_text() {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("\"{}\"", example),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }
    if let Some(notes) = card.notes_text() {
        lines.push(Line::styled(notes.to_string(), muted));
    }
    lines.push(Line::from(""));

    match state.phase {
        ReviewPhase::Submitting => lines.push(Line::styled("Saving...", muted)),
        ReviewPhase::Done => lines.push(Line::styled("Saved", word_style)),
        _ => {
            let mut spans = Vec::new();
            for rating in Rating::ALL {
                spans.push(Span::styled(
                    format!(" {} ", rating.value()),
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
                spans.push(Span::raw(format!(" {}   ", rating.label())));
            }
            lines.push(Line::from(spans));
        }
    }

    if let Some(ref error) = state.error {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            error.clone(),
            Style::default().fg(color(app.palette.destructive)),
        ));
    }
    lines
}

fn draw_statistics_screen(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref stats) = app.statistics else {
        let text = if let Some(ref error) = app.statistics_error {
            format!("Could not load statistics: {}", error)
        } else {
            "Loading...".to_string()
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().title(" Statistics ").borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(area);

    let summary = vec![
        Line::from(format!(
            "Total {}   Due {}   Learning {}   Reviewing {}   Mastered {}",
            stats.total_cards,
            stats.due_cards,
            stats.learning_cards,
            stats.reviewing_cards,
            stats.mastered_cards
        )),
        Line::from(format!(
            "{} reviews over the last {} days",
            stats.total_reviews(),
            stats.daily_reviews.len()
        )),
    ];
    frame.render_widget(
        Paragraph::new(summary).block(Block::default().title(" Overview ").borders(Borders::ALL)),
        chunks[0],
    );

    let mastery = stats.mastery_percent();
    let gauge = Gauge::default()
        .block(Block::default().title(" Mastery ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color(app.palette.primary)))
        .ratio((mastery / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", mastery));
    frame.render_widget(gauge, chunks[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    draw_rating_chart(frame, app, stats, bottom[0]);
    draw_daily_chart(frame, app, stats, bottom[1]);
}

fn draw_rating_chart(frame: &mut Frame, app: &App, stats: &Statistics, area: Rect) {
    let bars: Vec<Bar> = stats
        .rating_distribution()
        .into_iter()
        .map(|(rating, count)| {
            Bar::default()
                .value(count as u64)
                .label(Line::from(rating.label()))
                .style(Style::default().fg(color(app.palette.primary)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(" Ratings ").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2);
    frame.render_widget(chart, area);
}

fn draw_daily_chart(frame: &mut Frame, app: &App, stats: &Statistics, area: Rect) {
    let mut days = stats.daily_reviews.clone();
    days.sort_by_key(|d| d.date);

    let bars: Vec<Bar> = days
        .iter()
        .map(|day| {
            Bar::default()
                .value(day.count as u64)
                .label(Line::from(day.date.format("%a").to_string()))
                .style(Style::default().fg(color(app.palette.muted)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(" Reviews per day ").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);
    frame.render_widget(chart, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        match app.screen {
            Screen::Cards => "j/k:move  Tab:due/all  Enter:review  s:stats  R:refresh  ?:help  q:quit",
            Screen::Review => "Space:flip  1-4:rate  Esc:back",
            Screen::Statistics => "R:refresh  Esc:back",
        }
        .to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Rectangle of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn draw_error_modal(frame: &mut Frame, app: &App, error: &str) {
    let popup_area = centered(frame.area(), 50, 7);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(app.palette.destructive)));
    let text = vec![
        Line::from(error.to_string()),
        Line::from(""),
        Line::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 50, 20);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Cards:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  gg / G      Jump to first / last card"),
        Line::from("  Tab         Switch due / all"),
        Line::from("  Enter, r    Review selected card"),
        Line::from("  s           Statistics"),
        Line::from("  R           Refresh"),
        Line::from(""),
        Line::from("Review:"),
        Line::from("  Space       Flip card"),
        Line::from("  1-4         Hard, Good, Easy, Perfect"),
        Line::from("  Esc         Back to cards"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}
