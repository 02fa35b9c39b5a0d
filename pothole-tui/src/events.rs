use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

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

    // If detail overlay is shown, handle overlay-specific keys
    if app.detail_event.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow stepping through events while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Map),
        KeyCode::Char('3') => app.set_view(View::Charts),
        KeyCode::Char('4') => app.set_view(View::Logs),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Enter detail overlay
        KeyCode::Enter => app.enter_detail(),

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Poll now
        KeyCode::Char('r') => app.refresh(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
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

/// Handle mouse events. `tab_row` is the screen row of the tab bar.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, tab_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click on a tab title
        MouseEventKind::Down(MouseButton::Left) if mouse.row == tab_row => {
            if let Some(view) = tab_at(mouse.column) {
                app.set_view(view);
            }
        }
        _ => {}
    }
}

/// The view whose tab title covers `column`.
///
/// Mirrors the tab bar layout: each title is padded by one cell on each
/// side and followed by a one-cell divider.
pub fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let width = format!(" {}:{} ", view.index() + 1, view.label()).chars().count() as u16 + 2;
        if column < start + width {
            return Some(view);
        }
        start += width + 1;
        if column < start {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Theme;
    use async_trait::async_trait;
    use crossterm::event::KeyEventKind;
    use pothole_adapters::{FeedSource, FetchError, RawRecord};
    use pothole_pipeline::Scheduler;
    use tokio::runtime::Handle;

    #[derive(Debug)]
    struct ThreeEvents;

    #[async_trait]
    impl FeedSource for ThreeEvents {
        async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
            Ok((1..=3)
                .map(|i| {
                    RawRecord::new(i)
                        .magnitude("2.0")
                        .lat("30.76")
                        .lon("76.60")
                        .created_at(format!("2025-03-01T0{}:00:00Z", i))
                })
                .collect())
        }

        fn description(&self) -> &str {
            "three events"
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    async fn loaded_app() -> App {
        let scheduler = Scheduler::builder(ThreeEvents).build();
        scheduler.poll_now().await;
        let mut app = App::new(scheduler, Handle::current(), Theme::dark());
        app.reload_data();
        app
    }

    #[tokio::test]
    async fn number_keys_switch_views() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.current_view, View::Logs);
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(app.current_view, View::Dashboard);
        handle_key_event(&mut app, press(KeyCode::Left));
        assert_eq!(app.current_view, View::Logs);
    }

    #[test]
    fn tab_columns() {
        // " 1:Dashboard " padded to 15 cells, then the divider
        assert_eq!(tab_at(0), Some(View::Dashboard));
        assert_eq!(tab_at(14), Some(View::Dashboard));
        assert_eq!(tab_at(15), None);
        // " 2:Map " padded to 9 cells
        assert_eq!(tab_at(16), Some(View::Map));
        assert_eq!(tab_at(24), Some(View::Map));
        assert_eq!(tab_at(26), Some(View::Charts));
        assert_eq!(tab_at(200), None);
    }

    #[tokio::test]
    async fn help_swallows_next_key() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, press(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[tokio::test]
    async fn overlay_keys() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, press(KeyCode::Down));
        handle_key_event(&mut app, press(KeyCode::Enter));
        assert_eq!(app.detail().map(|e| e.id), Some(Some(2)));

        handle_key_event(&mut app, press(KeyCode::Down));
        assert_eq!(app.detail().map(|e| e.id), Some(Some(1)));

        // q closes the overlay rather than quitting
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.detail_event.is_none());
        assert!(app.running);

        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }
}
