use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub fn handle_detail_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Backspace => {
            app.detail = None;
            app.detail_error = None;
            app.screen = AppScreen::Points;
        }
        KeyCode::Char('q') => {
            app.running = false;
        }
        _ => {}
    }
}
