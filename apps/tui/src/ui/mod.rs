pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    match app.screen {
        AppScreen::Dashboard => screens::dashboard::render_dashboard(app, f),
        AppScreen::Points => screens::points::render_points_view(app, f),
        AppScreen::PointDetail => screens::detail::render_point_detail(app, f),
        AppScreen::Report => screens::report::render_report(app, f),
    }

    if app.show_help {
        screens::help::render_help_popup(f, f.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::report::SimulatedReportGenerator;
    use crate::seed::SeedSource;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;

    async fn loaded_app() -> App {
        let mut app = App::new(
            AppConfig::default(),
            Arc::new(SeedSource::bundled().unwrap()),
            Arc::new(SimulatedReportGenerator::default()),
        );
        app.refresh().await;
        app
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[tokio::test]
    async fn every_screen_renders() {
        let mut app = loaded_app().await;
        for screen in [
            AppScreen::Dashboard,
            AppScreen::Points,
            AppScreen::PointDetail,
            AppScreen::Report,
        ] {
            app.screen = screen;
            assert!(!screen_text(&app).trim().is_empty());
        }
        app.show_help = true;
        assert!(screen_text(&app).contains("Help"));
    }

    #[tokio::test]
    async fn dashboard_shows_filters_and_empty_state() {
        let mut app = loaded_app().await;
        let text = screen_text(&app);
        assert!(text.contains("Radar de Riesgo"));
        assert!(text.contains("Filters"));

        app.filters = app.filters.clone().with_location(Some("atlantis"));
        app.on_filters_changed();
        assert!(screen_text(&app).contains("No points match the current filters"));
    }
}
