use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_report_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Enter => app.close_report(),
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Up => {
            app.report_scroll = app.report_scroll.saturating_sub(1);
        }
        KeyCode::Down => {
            app.report_scroll = app.report_scroll.saturating_add(1);
        }
        KeyCode::PageUp => {
            app.report_scroll = app.report_scroll.saturating_sub(10);
        }
        KeyCode::PageDown => {
            app.report_scroll = app.report_scroll.saturating_add(10);
        }
        KeyCode::Home => {
            app.report_scroll = 0;
        }
        _ => {}
    }
}
