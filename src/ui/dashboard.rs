//! Dashboard view rendering.
//!
//! Engine status, the latest alert, controller gauges, the raw controller
//! values and recent trends.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::common::{feed_notice, gauge_line, panel, render_bar, render_sparkline};
use crate::app::App;
use crate::data::{battery_color, format_timestamp, gauge, status_color, Gauge, Metric};
use crate::telemetry::TelemetryPath;

/// Width of the gauge bars.
const BAR_WIDTH: usize = 24;

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(5), // Status and latest alert
        Constraint::Length(7), // Gauges
        Constraint::Min(4),    // Raw values and trends
    ])
    .split(area);

    let cards = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_status(frame, app, cards[0]);
    render_latest_alert(frame, app, cards[1]);

    render_gauges(frame, app, rows[1]);

    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_raw_values(frame, app, bottom[0]);
    render_trends(frame, app, bottom[1]);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Engine Status");
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Status)) {
        frame.render_widget(Paragraph::new(notice).block(block), area);
        return;
    }

    let status = app.status().unwrap_or_default();
    let code = status.status_code();
    let style = app.theme.status_style(status_color(code));
    let code_text = code.map(|c| format!("{}", c)).unwrap_or_else(|| "N/A".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled("● ", style),
            Span::styled(
                status.engine_status().unwrap_or_else(|| "Unknown".to_string()),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  (code {})", code_text), Style::default().fg(app.theme.muted)),
        ]),
        Line::from(Span::styled(
            format!("Updated {}", format_timestamp(status.timestamp().as_deref())),
            Style::default().fg(app.theme.muted),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_latest_alert(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Latest Alert");
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Alerts)) {
        frame.render_widget(Paragraph::new(notice).block(block), area);
        return;
    }

    let alerts = app.alerts();
    let lines = match alerts.first() {
        Some(alert) => {
            let style = app.theme.status_style(alert.severity.color());
            vec![
                Line::from(vec![
                    Span::styled(format!("{} ", alert.severity.label().to_uppercase()), style),
                    Span::raw(alert.message.clone()),
                ]),
                Line::from(Span::styled(
                    format!("{}  ({} active)", alert.formatted_timestamp(), alerts.len()),
                    Style::default().fg(app.theme.muted),
                )),
            ]
        }
        None => vec![Line::styled(
            "No active alerts",
            Style::default().fg(app.theme.muted),
        )],
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_gauges(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Controller");
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Controller)) {
        frame.render_widget(Paragraph::new(notice).block(block), area);
        return;
    }

    let controller = app.controller().unwrap_or_default();
    let mut lines = vec![
        gauge_line(app, "RPM", &gauge::RPM, controller.rpm(), BAR_WIDTH),
        gauge_line(app, "Oil Pressure", &gauge::OIL_PRESSURE, controller.oil_pressure(), BAR_WIDTH),
        gauge_line(app, "Temperature", &gauge::TEMPERATURE, controller.temperature(), BAR_WIDTH),
        gauge_line(app, "Fuel Level", &gauge::FUEL, controller.fuel_level(), BAR_WIDTH),
    ];

    // Battery takes its own classification, not the gauge bands
    let battery = controller.battery_level();
    let battery_style = app.theme.status_style(battery_color(controller.battery_level.as_ref()));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<16}", "Battery"), Style::default().fg(app.theme.muted)),
        Span::styled(
            render_bar(gauge::BATTERY.ratio(battery), BAR_WIDTH),
            battery_style,
        ),
        Span::styled(format!(" {:>8.1} {}", battery, gauge::BATTERY.unit), battery_style),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_raw_values(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Raw Values");
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Controller)) {
        frame.render_widget(Paragraph::new(notice).block(block), area);
        return;
    }

    let controller = app.controller().unwrap_or_default();
    let header = Row::new(vec![Cell::from("Field"), Cell::from("Value")])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = controller
        .raw_fields()
        .into_iter()
        .map(|(key, value)| {
            Row::new(vec![
                Cell::from(key).style(Style::default().fg(app.theme.muted)),
                Cell::from(value),
            ])
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Fill(2)];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_trends(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Trends");
    let width = area.width.saturating_sub(2 + 16 + 10) as usize;

    let lines: Vec<Line> = Metric::ALL
        .iter()
        .map(|&metric| {
            let data = app.history.sparkline(metric);
            let shown = &data[data.len().saturating_sub(width)..];
            let latest = app.history.latest(metric);
            let style = latest
                .map(|value| app.theme.status_style(metric_gauge(metric).color(value)))
                .unwrap_or_else(|| Style::default().fg(app.theme.muted));

            Line::from(vec![
                Span::styled(format!("{:<16}", metric.label()), Style::default().fg(app.theme.muted)),
                Span::styled(render_sparkline(shown), style),
                Span::raw(
                    latest
                        .map(|value| format!(" {:.1}", value))
                        .unwrap_or_else(|| " -".to_string()),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn metric_gauge(metric: Metric) -> &'static Gauge {
    match metric {
        Metric::Rpm => &gauge::RPM,
        Metric::OilPressure => &gauge::OIL_PRESSURE,
        Metric::Battery => &gauge::BATTERY,
        Metric::Fuel => &gauge::FUEL,
        Metric::Temperature => &gauge::TEMPERATURE,
    }
}
