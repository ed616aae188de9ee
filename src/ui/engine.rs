//! Engine view rendering.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::common::{feed_notice, gauge_line, panel};
use crate::app::App;
use crate::data::{gauge, Gauge};
use crate::telemetry::TelemetryPath;

/// Render the Engine view: line voltages, phase currents and bus voltages.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::EngineData)) {
        frame.render_widget(Paragraph::new(notice).block(panel(app, "Engine")), area);
        return;
    }

    let engine = app.engine().unwrap_or_default();
    let rows = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .split(area);

    render_group(frame, app, rows[0], "Line Voltage", "L", &gauge::LINE_VOLTAGE, engine.line_voltages());
    render_group(frame, app, rows[1], "Phase Current", "L", &gauge::PHASE_CURRENT, engine.phase_currents());
    render_group(frame, app, rows[2], "Bus Voltage", "Bus ", &gauge::BUS_VOLTAGE, engine.bus_voltages());
}

fn render_group(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    prefix: &str,
    gauge: &Gauge,
    values: [f64; 3],
) {
    let bar_width = area.width.saturating_sub(2 + 16 + 14).max(4) as usize;
    let lines: Vec<Line> = values
        .iter()
        .enumerate()
        .map(|(i, value)| gauge_line(app, &format!("{}{}", prefix, i + 1), gauge, *value, bar_width))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel(app, title)), area);
}
