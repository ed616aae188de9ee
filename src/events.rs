use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// File written by the `e` key.
pub const EXPORT_FILE: &str = "genset_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If search input is active, handle text input
    if app.search_active {
        handle_search_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Engine),
        KeyCode::Char('3') => app.set_view(View::Optimisation),
        KeyCode::Char('4') => app.set_view(View::Alerts),

        // Alert selection
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),

        // Poll now
        KeyCode::Char('r') => {
            if app.reload_data() {
                app.set_status_message("Updated".to_string());
            } else {
                app.set_status_message("No new data".to_string());
            }
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Alert filters
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('f') => {
            app.set_view(View::Alerts);
            app.cycle_severity();
        }
        KeyCode::Char('c') => {
            if app.alert_filter.is_active() {
                app.clear_filter();
            }
        }

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while search is active
fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm or cancel (keep text but exit input mode)
        KeyCode::Enter | KeyCode::Esc => app.cancel_search(),

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.search_pop();
            if app.alert_filter.query.is_empty() {
                app.cancel_search();
            }
        }

        KeyCode::Char(c) => app.search_push(c),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Tabs are on row 1, after the header
            if clicked_row == 1 {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
                return;
            }

            // Alert rows start after the table border and header row
            if app.current_view == View::Alerts && clicked_row > content_start_row + 1 {
                let item_row = (clicked_row - content_start_row - 2) as usize;
                app.select_alert(item_row);
            }
        }

        _ => {}
    }
}

/// The tab under a column of the tab bar.
fn tab_at(column: u16) -> Option<View> {
    // Tabs are rendered as " n:label " separated by "|"
    let mut start = 0u16;
    for view in View::ALL {
        let width = view.label().len() as u16 + 4;
        if column < start + width {
            return Some(view);
        }
        start += width + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::ui::Theme;
    use serde_json::json;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let source = MemorySource::with_root(json!({
            "Alerts": {"battery_alert": "Battery low", "fuel_alert": "Fuel low"}
        }));
        App::new(Arc::new(source), Theme::dark())
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Optimisation);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Alerts);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Optimisation);
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.current_view, View::Alerts);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_search_input() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.current_view, View::Alerts);
        assert!(app.search_active);

        for c in "fuel".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        // 'q' while typing is text, not quit
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.alert_filter.query, "fuelq");

        handle_key_event(&mut app, key(KeyCode::Backspace));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.search_active);
        app.reload_data();
        assert_eq!(app.filtered_alerts().len(), 1);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.alert_filter.query.is_empty());
    }

    #[test]
    fn test_severity_key_cycles() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('f')));
        assert_eq!(app.current_view, View::Alerts);
        assert_eq!(app.alert_filter.severity_label(), "critical");
    }

    #[test]
    fn test_tab_at() {
        assert_eq!(tab_at(0), Some(View::Dashboard));
        assert_eq!(tab_at(12), Some(View::Dashboard));
        assert_eq!(tab_at(15), Some(View::Engine));
        assert_eq!(tab_at(100), None);
    }
}
