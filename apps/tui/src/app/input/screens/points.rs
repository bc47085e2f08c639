use crate::app::input::helpers::{step_selection, PAGE_STEP};
use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub async fn handle_points_input(app: &mut App, key: KeyCode) {
    if app.search_active {
        handle_search_input(app, key);
        return;
    }

    let total_rows = app.listed_points().len();

    match key {
        KeyCode::Esc => {
            if app.search_query.is_empty() {
                app.screen = AppScreen::Dashboard;
            } else {
                app.search_query.clear();
                app.selected_point_index = 0;
            }
        }
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Char('/') => {
            app.search_active = true;
        }
        KeyCode::Enter => {
            if total_rows > 0 {
                app.open_selected_detail().await;
            }
        }
        KeyCode::Up => {
            app.selected_point_index = step_selection(app.selected_point_index, -1, total_rows);
        }
        KeyCode::Down => {
            app.selected_point_index = step_selection(app.selected_point_index, 1, total_rows);
        }
        KeyCode::PageUp => {
            app.selected_point_index =
                step_selection(app.selected_point_index, -PAGE_STEP, total_rows);
        }
        KeyCode::PageDown => {
            app.selected_point_index =
                step_selection(app.selected_point_index, PAGE_STEP, total_rows);
        }
        KeyCode::Home => {
            app.selected_point_index = 0;
        }
        KeyCode::End => {
            app.selected_point_index = total_rows.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.search_active = false;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.search_active = false;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
        }
        _ => return,
    }
    app.selected_point_index = 0;
}
