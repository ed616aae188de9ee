//! Alerts view rendering.
//!
//! A filterable table of the current alerts with the selected row highlighted.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{feed_notice, panel};
use crate::app::App;
use crate::data::StatusColor;
use crate::telemetry::TelemetryPath;

/// Render the Alerts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Alerts)) {
        frame.render_widget(Paragraph::new(notice).block(panel(app, "Alerts")), area);
        return;
    }

    let total = app.alerts().len();
    let alerts = app.filtered_alerts();

    let filter_info = if app.search_active {
        format!(" /{}_", app.alert_filter.query)
    } else if !app.alert_filter.query.is_empty() {
        format!(" /{}/ [c:clear]", app.alert_filter.query)
    } else {
        String::new()
    };

    let position_info = if !alerts.is_empty() {
        format!(" [{}/{}]", app.selected_alert + 1, alerts.len())
    } else {
        String::new()
    };

    let title = format!(
        "Alerts ({} of {}) [f:{}]{}{}",
        alerts.len(),
        total,
        app.alert_filter.severity_label(),
        filter_info,
        position_info
    );

    let mut block = panel(app, &title);
    if alerts.iter().any(|a| a.severity.color() == StatusColor::Red) {
        block = block.border_style(app.theme.status_style(StatusColor::Red));
    }

    if alerts.is_empty() {
        let message = if total == 0 { "No active alerts" } else { "No alerts match the filter" };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Severity"),
        Cell::from("Message"),
        Cell::from("Time"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|alert| {
            let style = app.theme.status_style(alert.severity.color());
            Row::new(vec![
                Cell::from(alert.severity.label().to_uppercase()).style(style),
                Cell::from(alert.message.clone()),
                Cell::from(alert.formatted_timestamp()).style(Style::default().fg(app.theme.muted)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10), // Severity
        Constraint::Fill(3),    // Message
        Constraint::Length(24), // Time
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_alert.min(alerts.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}
