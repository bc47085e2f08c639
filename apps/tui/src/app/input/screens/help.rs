use crate::app::state::App;
use crossterm::event::KeyCode;

/// Keys that work on every screen. Returns `true` when the key was consumed.
///
/// While the help overlay is open it swallows everything; F1 or Esc close it.
/// Space and `?` only count when the screen is not collecting text.
pub fn handle_global_keys(app: &mut App, key: KeyCode, typing: bool) -> bool {
    if app.show_help {
        if matches!(key, KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return true;
    }

    match key {
        KeyCode::F(1) => app.show_help = true,
        KeyCode::Char('?') if !typing => app.show_help = true,
        KeyCode::Char(' ') if !typing => app.toggle_animation_pause(),
        _ => return false,
    }
    true
}
