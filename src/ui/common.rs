//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay,
//! and small helpers for panels, bars and sparklines.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{status_color, Gauge, StatusColor};
use crate::live::{LiveData, LiveState};

const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the header bar with the engine status and data source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.status();
    let color = status_color(status.as_ref().and_then(|s| s.status_code()));
    let label = status
        .as_ref()
        .and_then(|s| s.engine_status())
        .unwrap_or_else(|| "Unknown".to_string());

    let errors = app.feeds.iter().filter(|feed| feed.error().is_some()).count();

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(color)),
        Span::styled("GENSET WATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(label, app.theme.status_style(color)),
        Span::raw(" │ "),
        Span::styled(app.source_description(), Style::default().fg(app.theme.muted)),
    ];
    if errors > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} feed error{}", errors, if errors == 1 { "" } else { "s" }),
            app.theme.status_style(StatusColor::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{}:{}", i + 1, view.label())))
        .collect();

    let selected = View::ALL.iter().position(|v| *v == app.current_view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary status messages, otherwise the view's controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Alerts if app.search_active => "Type to search | Enter:apply Esc:cancel",
        View::Alerts => "/:search f:severity c:clear ↑↓:select Tab:switch ?:help q:quit",
        _ => "Tab:switch r:poll e:export ?:help q:quit",
    };

    let loading = app.feeds.iter().filter(|feed| feed.loading()).count();
    let status = if loading > 0 {
        format!(" {} | Waiting for {} feed(s) | {}", app.current_view.label(), loading, controls)
    } else {
        format!(" {} | {}", app.current_view.label(), controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/←/→     Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Select alert"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Alerts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Search messages and times"),
        Line::from("  f         Cycle severity filter"),
        Line::from("  c         Clear filters"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Poll now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// A bordered panel in the theme's style.
pub fn panel<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Placeholder line for a feed that has nothing to show yet.
///
/// Returns `None` when the feed has data to render. A failed feed that still
/// holds data renders the data; the header reports the error.
pub fn feed_notice(app: &App, feed: Option<&LiveData>) -> Option<Line<'static>> {
    let Some(feed) = feed else {
        return Some(Line::from("Not subscribed"));
    };
    match feed.state() {
        LiveState::Idle => Some(Line::from("Not subscribed")),
        LiveState::Subscribing => Some(Line::styled(
            "Loading...",
            Style::default().add_modifier(Modifier::DIM),
        )),
        LiveState::Failed if feed.data().is_none() => {
            let err = feed.error().map(ToString::to_string).unwrap_or_default();
            Some(Line::styled(format!("Error: {}", err), app.theme.status_style(StatusColor::Red)))
        }
        _ if feed.data().is_none() => Some(Line::styled(
            "No data",
            Style::default().fg(app.theme.muted),
        )),
        _ => None,
    }
}

/// A horizontal bar filled to `ratio` of `width` cells.
pub fn render_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// One gauge as a label, a colored bar and the reading.
pub fn gauge_line(app: &App, label: &str, gauge: &Gauge, value: f64, bar_width: usize) -> Line<'static> {
    let style = app.theme.status_style(gauge.color(value));
    Line::from(vec![
        Span::styled(format!("{:<16}", label), Style::default().fg(app.theme.muted)),
        Span::styled(render_bar(gauge.ratio(value), bar_width), style),
        Span::styled(format!(" {:>8.1} {}", value, gauge.unit), style),
    ])
}

/// Render sparkline data as a string of bar characters.
pub fn render_sparkline(data: &[u8]) -> String {
    data.iter().map(|&v| SPARKLINE_CHARS[(v as usize).min(7)]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0.5, 4), "██░░");
        assert_eq!(render_bar(0.0, 3), "░░░");
        assert_eq!(render_bar(2.0, 3), "███");
    }

    #[test]
    fn test_render_sparkline() {
        assert_eq!(render_sparkline(&[0, 3, 7, 9]), "▁▄██");
        assert_eq!(render_sparkline(&[]), "");
    }
}
