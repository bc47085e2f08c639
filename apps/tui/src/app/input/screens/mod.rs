use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

mod dashboard;
mod detail;
mod help;
mod points;
mod report;

/// Whether the focused screen is collecting typed text.
const fn is_typing(app: &App) -> bool {
    match app.screen {
        AppScreen::Dashboard => app.editing,
        AppScreen::Points => app.search_active,
        AppScreen::PointDetail | AppScreen::Report => false,
    }
}

pub async fn dispatch_input(app: &mut App, key: KeyCode) -> color_eyre::Result<()> {
    if help::handle_global_keys(app, key, is_typing(app)) {
        return Ok(());
    }

    match app.screen {
        AppScreen::Dashboard => dashboard::handle_dashboard_input(app, key).await,
        AppScreen::Points => points::handle_points_input(app, key).await,
        AppScreen::PointDetail => detail::handle_detail_input(app, key),
        AppScreen::Report => report::handle_report_input(app, key),
    }

    Ok(())
}
