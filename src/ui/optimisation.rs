//! Optimisation view rendering.
//!
//! Availability figures and progress through the maintenance interval.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::common::{feed_notice, panel, render_bar};
use crate::app::App;
use crate::data::{
    format_hours, format_percentage, format_timestamp, maintenance_color, percentage_color,
    StatusColor,
};
use crate::telemetry::{OptimisationTelemetry, TelemetryPath};

/// Render the Optimisation view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = feed_notice(app, app.feed(TelemetryPath::Optimisation)) {
        frame.render_widget(Paragraph::new(notice).block(panel(app, "Optimisation")), area);
        return;
    }

    let data = app.optimisation().unwrap_or_default();
    let rows = Layout::vertical([
        Constraint::Length(5), // Percentages
        Constraint::Length(7), // Maintenance
        Constraint::Min(0),
    ])
    .split(area);

    let percentages = vec![
        Line::from(vec![
            label(app, "Availability"),
            Span::styled(
                format_percentage(data.availability.as_ref()),
                app.theme.status_style(percentage_color(data.availability.as_ref())),
            ),
        ]),
        Line::from(vec![label(app, "Off Service"), Span::raw(format_percentage(data.off_service.as_ref()))]),
        Line::from(vec![
            label(app, "Off vs Maintenance"),
            Span::raw(format_percentage(data.off_vs_maintenance.as_ref())),
        ]),
    ];
    frame.render_widget(Paragraph::new(percentages).block(panel(app, "Availability")), rows[0]);

    let bar_width = rows[1].width.saturating_sub(2 + 22 + 10).max(4) as usize;
    let maintenance = maintenance_lines(app, &data, bar_width);
    let title = format!("Maintenance  {}", format_timestamp(data.timestamp().as_deref()));
    frame.render_widget(Paragraph::new(maintenance).block(panel(app, &title)), rows[1]);
}

fn label(app: &App, text: &str) -> Span<'static> {
    Span::styled(format!("{:<22}", text), Style::default().fg(app.theme.muted))
}

/// Progress through the maintenance interval, with a warning line once it is
/// nearly used up.
fn maintenance_lines(app: &App, data: &OptimisationTelemetry, bar_width: usize) -> Vec<Line<'static>> {
    let progress = match data.maintenance_percentage() {
        Some(pct) => {
            let style = app.theme.status_style(maintenance_color(pct));
            Line::from(vec![
                label(app, "Maintenance"),
                Span::styled(render_bar(pct / 100.0, bar_width), style),
                Span::styled(format!(" {:.1}%", pct), style),
            ])
        }
        None => Line::from(vec![
            label(app, "Maintenance"),
            Span::styled("N/A", app.theme.status_style(StatusColor::Grey)),
        ]),
    };

    let mut lines = vec![
        progress,
        Line::from(vec![
            label(app, "Run / Interval"),
            Span::raw(format!(
                "{} / {}",
                format_hours(data.run_hours()),
                format_hours(data.maintenance_hours())
            )),
        ]),
        Line::from(vec![label(app, "Hours Remaining"), Span::raw(format_hours(data.hours_remaining()))]),
        Line::from(vec![label(app, "Stop Time"), Span::raw(format_hours(data.stop_time()))]),
    ];
    if data.maintenance_due_soon() {
        lines.push(Line::styled(
            "Maintenance required soon!",
            app.theme.status_style(StatusColor::Red),
        ));
    }
    lines
}
