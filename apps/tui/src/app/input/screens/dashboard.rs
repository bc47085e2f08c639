use crate::app::input::helpers::{next_chart_tab, next_field, previous_field};
use crate::app::state::{App, AppScreen, RADIUS_STEP_KM, RISK_STEP};
use crossterm::event::KeyCode;

pub async fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    if app.editing {
        handle_edit_input(app, key);
        return;
    }

    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Tab | KeyCode::Down => app.focused_field = next_field(app.focused_field),
        KeyCode::BackTab | KeyCode::Up => app.focused_field = previous_field(app.focused_field),
        KeyCode::Left => app.adjust_focused(false),
        KeyCode::Right => app.adjust_focused(true),
        KeyCode::Enter => app.begin_edit(),
        KeyCode::Delete => app.clear_field(),
        KeyCode::Char('o') => app.toggle_radius(),
        KeyCode::Char('+' | '=') => app.adjust_radius(RADIUS_STEP_KM),
        KeyCode::Char('-') => app.adjust_radius(-RADIUS_STEP_KM),
        KeyCode::Char('>') => app.thermometer.raise(RISK_STEP),
        KeyCode::Char('<') => app.thermometer.lower(RISK_STEP),
        KeyCode::Char('g') => app.request_report(),
        KeyCode::Char('l') => {
            app.selected_point_index = 0;
            app.screen = AppScreen::Points;
        }
        KeyCode::Char('r') => app.refresh().await,
        KeyCode::Char('c') => app.chart_tab_index = next_chart_tab(app.chart_tab_index),
        KeyCode::Char('x') => app.reset(),
        _ => {}
    }
}

fn handle_edit_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Backspace => {
            app.edit_buffer.pop();
        }
        KeyCode::Char(c) => app.edit_buffer.push(c),
        _ => {}
    }
}
