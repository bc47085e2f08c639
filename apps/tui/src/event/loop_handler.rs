use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Stdout;
use std::time::Duration;

use crate::app::{handle_input, App, LoadState};
use crate::domain::MonitoringPoint;
use crate::filter;
use crate::report::{Report, ReportStatus};
use crate::ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Run the application in headless mode (no UI)
pub async fn run_headless(app: &mut App, json: bool, generate_report: bool) -> Result<()> {
    app.refresh().await;
    if let LoadState::Failed(reason) = &app.load_state {
        return Err(eyre!("{reason}"));
    }

    let report = if generate_report {
        Some(generate(app).await?)
    } else {
        None
    };
    let summary = build_summary(app, report);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_text(&summary));
    }

    Ok(())
}

async fn generate(app: &mut App) -> Result<Report> {
    app.request_report();
    match app.report.wait().await {
        ReportStatus::Resolved(report) => Ok(report.clone()),
        ReportStatus::Failed(reason) => Err(eyre!("Report failed: {reason}")),
        other => Err(eyre!("Report ended in state {other}")),
    }
}

#[derive(Debug, Serialize)]
pub struct HeadlessSummary {
    pub source: &'static str,
    pub center: crate::geo::Coordinate,
    pub radius_km: Option<f64>,
    pub active_filters: Vec<&'static str>,
    pub candidates: usize,
    pub visible: usize,
    pub by_category: BTreeMap<String, usize>,
    pub points: Vec<HeadlessPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessPoint {
    pub id: String,
    pub category: String,
    pub name: String,
    pub distance_km: f64,
    pub report_id: Option<String>,
    pub parameter: Option<String>,
    pub sample_date: Option<String>,
    pub location: Option<String>,
}

impl HeadlessPoint {
    fn from_point(point: &MonitoringPoint, center: &crate::geo::Coordinate) -> Self {
        Self {
            id: point.id.clone(),
            category: point.category.as_str().to_string(),
            name: point.name.clone(),
            distance_km: (point.distance_from(center) * 100.0).round() / 100.0,
            report_id: point.report_id.clone(),
            parameter: point.parameter.clone(),
            sample_date: point.sample_date.map(|d| d.format("%Y-%m-%d").to_string()),
            location: point.location.clone(),
        }
    }
}

pub fn build_summary(app: &App, report: Option<Report>) -> HeadlessSummary {
    let center = app.filters.center;
    let visible = app.visible_points();
    let summary = filter::summarize(&visible, &center);

    HeadlessSummary {
        source: app.actions.source_name(),
        center,
        radius_km: app.radius_applied().then_some(app.filters.radius_km),
        active_filters: filter::active_stages(&app.filters, &app.config.map)
            .into_iter()
            .map(filter::FilterStage::label)
            .collect(),
        candidates: app.points.len(),
        visible: summary.total,
        by_category: summary
            .by_category
            .iter()
            .map(|(category, count)| (category.as_str().to_string(), *count))
            .collect(),
        points: visible
            .iter()
            .map(|p| HeadlessPoint::from_point(p, &center))
            .collect(),
        report,
    }
}

fn render_text(summary: &HeadlessSummary) -> String {
    let mut out = String::new();
    out.push_str("\nRadar de Riesgo Hídrico\n");
    out.push_str("=======================\n");
    out.push_str(&format!("Source: {}\n", summary.source));
    out.push_str(&format!("Center: {}\n", summary.center));
    match summary.radius_km {
        Some(radius) => out.push_str(&format!("Radius: {radius:.1} km\n")),
        None => out.push_str("Radius: off\n"),
    }
    if !summary.active_filters.is_empty() {
        out.push_str(&format!("Filters: {}\n", summary.active_filters.join(", ")));
    }
    out.push_str(&format!(
        "Visible points: {} of {}\n",
        summary.visible, summary.candidates
    ));

    out.push_str("\nBy category:\n");
    for (category, count) in &summary.by_category {
        out.push_str(&format!("- {category}: {count}\n"));
    }

    if summary.points.is_empty() {
        out.push_str("\nNo points match the current filters\n");
    } else {
        out.push_str("\nPoints:\n");
        for point in &summary.points {
            out.push_str(&format!(
                "- {} | {} | {} | {:.2} km | {}\n",
                point.id,
                point.category,
                point.name,
                point.distance_km,
                point.sample_date.as_deref().unwrap_or("-")
            ));
        }
    }

    if let Some(report) = &summary.report {
        out.push('\n');
        out.push_str(&report.to_text());
    }
    out
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    app.refresh().await;

    loop {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(eyre!("Terminal draw error: {e}"));
        }

        if matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code).await?;
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
                        tracing::warn!("redraw after resize failed: {e}");
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("failed to read terminal event: {e}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::report::SimulatedReportGenerator;
    use crate::seed::SeedSource;
    use std::sync::Arc;

    async fn app() -> App {
        let config = AppConfig {
            report_delay: Duration::from_millis(5),
            ..AppConfig::default()
        };
        let generator = SimulatedReportGenerator::new(config.report_delay);
        let mut app = App::new(
            config,
            Arc::new(SeedSource::bundled().unwrap()),
            Arc::new(generator),
        );
        app.refresh().await;
        app
    }

    #[tokio::test]
    async fn summary_lists_points_inside_the_radius() {
        let app = app().await;
        let summary = build_summary(&app, None);
        assert_eq!(summary.source, "seed");
        assert_eq!(summary.candidates, 19);
        assert_eq!(summary.radius_km, Some(20.0));
        assert!(summary.points.iter().all(|p| p.distance_km <= 20.0));
        assert_eq!(summary.visible, summary.points.len());
        assert_eq!(summary.active_filters, vec!["radius"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("report").is_none());
        assert_eq!(json["center"]["lat"], -11.525);
    }

    #[tokio::test]
    async fn report_is_attached_when_requested() {
        let mut app = app().await;
        let report = generate(&mut app).await.unwrap();
        let summary = build_summary(&app, Some(report));
        let text = render_text(&summary);
        assert!(text.contains("Visible points"));
        assert!(summary.report.is_some());
    }

    #[tokio::test]
    async fn empty_views_say_so() {
        let mut app = app().await;
        app.filters = app.filters.clone().with_location(Some("atlantis"));
        let text = render_text(&build_summary(&app, None));
        assert!(text.contains("No points match the current filters"));
        assert!(generate(&mut app).await.is_err());
    }
}
