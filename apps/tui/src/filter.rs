//! Point filter pipeline.
//!
//! Every stage is a pure predicate over a single point, so the pipeline is
//! recomputed from the full candidate list whenever a control changes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Category, CategorySelection, DateRange, FilterState, MonitoringPoint, ReportSelection};
use crate::geo::Coordinate;
use crate::map::MapConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Category,
    DateRange,
    Report,
    Location,
    Radius,
}

impl FilterStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::DateRange => "dates",
            Self::Report => "report",
            Self::Location => "location",
            Self::Radius => "radius",
        }
    }
}

pub fn by_category(point: &MonitoringPoint, selection: CategorySelection) -> bool {
    selection.matches(point.category)
}

/// Undated points stay visible while a date range is active.
pub fn by_date_range(point: &MonitoringPoint, range: &DateRange) -> bool {
    point.sample_date.is_none_or(|date| range.contains(date))
}

pub fn by_report(point: &MonitoringPoint, selection: &ReportSelection) -> bool {
    selection
        .as_option()
        .is_none_or(|report| point.matches_report(report))
}

pub fn by_location(point: &MonitoringPoint, needle: Option<&str>) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    point
        .location
        .as_deref()
        .is_some_and(|location| location.to_lowercase().contains(&needle))
        || point.name.to_lowercase().contains(&needle)
}

pub fn by_radius(point: &MonitoringPoint, center: &Coordinate, radius_km: f64) -> bool {
    point.distance_from(center) <= radius_km
}

/// Stages that will actually constrain the result for this state and config.
pub fn active_stages(state: &FilterState, config: &MapConfig) -> Vec<FilterStage> {
    let mut stages = Vec::new();
    if state.category != CategorySelection::All {
        stages.push(FilterStage::Category);
    }
    if config.enable_date_filter && state.date_range.bounds().is_some() {
        stages.push(FilterStage::DateRange);
    }
    if config.enable_report_filter && state.report != ReportSelection::All {
        stages.push(FilterStage::Report);
    }
    if state.location.as_deref().is_some_and(|l| !l.trim().is_empty()) {
        stages.push(FilterStage::Location);
    }
    if config.show_radius && state.radius_enabled {
        stages.push(FilterStage::Radius);
    }
    stages
}

/// Runs category, date, report, location and radius stages in that order.
pub fn apply<'a>(
    points: &'a [MonitoringPoint],
    state: &FilterState,
    config: &MapConfig,
) -> Vec<&'a MonitoringPoint> {
    let date_active = config.enable_date_filter && state.date_range.bounds().is_some();
    let radius_active = config.show_radius && state.radius_enabled;

    let filtered: Vec<&MonitoringPoint> = points
        .iter()
        .filter(|p| by_category(p, state.category))
        .filter(|p| !date_active || by_date_range(p, &state.date_range))
        .filter(|p| !config.enable_report_filter || by_report(p, &state.report))
        .filter(|p| by_location(p, state.location.as_deref()))
        .filter(|p| !radius_active || by_radius(p, &state.center, state.radius_km))
        .collect();

    tracing::debug!(
        candidates = points.len(),
        visible = filtered.len(),
        "filter pipeline recomputed"
    );
    filtered
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSummary {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub nearest_km: Option<f64>,
    pub farthest_km: Option<f64>,
}

impl FilterSummary {
    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

pub fn summarize(points: &[&MonitoringPoint], center: &Coordinate) -> FilterSummary {
    let mut summary = FilterSummary {
        total: points.len(),
        ..FilterSummary::default()
    };
    for category in Category::ALL {
        summary.by_category.insert(category, 0);
    }
    for point in points {
        *summary.by_category.entry(point.category).or_insert(0) += 1;
        let distance = point.distance_from(center);
        summary.nearest_km = Some(summary.nearest_km.map_or(distance, |d| d.min(distance)));
        summary.farthest_km = Some(summary.farthest_km.map_or(distance, |d| d.max(distance)));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CENTER;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn point(id: &str, category: Category, lat: f64, lng: f64) -> MonitoringPoint {
        MonitoringPoint::new(id, category, Coordinate::new(lat, lng), id).unwrap()
    }

    fn sample_points() -> Vec<MonitoringPoint> {
        vec![
            point("OEFA-A", Category::CausalityEvaluation, -11.525, -76.975)
                .with_sample(Some("R1"), Some("NITRITOS"), date(2018, 2, 20))
                .with_location("Lima, Huarochirí"),
            point("OEFA-B", Category::CausalityEvaluation, -11.425, -76.925)
                .with_sample(Some("R1"), Some("FENOLES"), date(2018, 3, 1)),
            point("OEFA-C", Category::CausalityEvaluation, -14.625, -74.125)
                .with_sample(Some("R2"), None, None)
                .with_location("Ica, Ica"),
            point("IE_001", Category::Education, -11.525, -76.975),
            point("IE_003", Category::Education, -11.565, -77.025),
            point("EESS_001", Category::Health, -11.535, -76.985),
            point("CP_001", Category::Population, -11.515, -76.965),
            point("FAR", Category::Population, -9.423, -78.645),
        ]
    }

    fn everything_off() -> MapConfig {
        MapConfig {
            show_radius: false,
            ..MapConfig::default()
        }
    }

    fn ids(points: &[&MonitoringPoint]) -> Vec<String> {
        points.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn no_active_filters_returns_everything() {
        let points = sample_points();
        let result = apply(&points, &FilterState::default(), &everything_off());
        assert_eq!(result.len(), points.len());
    }

    #[test]
    fn education_filter_returns_only_education() {
        let points = sample_points();
        let state = FilterState::default().with_category(CategorySelection::Only(Category::Education));
        let result = apply(&points, &state, &everything_off());
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.category == Category::Education));
    }

    #[test]
    fn radius_filter_matches_haversine_exactly() {
        let points = sample_points();
        let state = FilterState::new(DEFAULT_CENTER, 20.0);
        let result = apply(&points, &state, &MapConfig::default());
        let expected: Vec<String> = points
            .iter()
            .filter(|p| p.distance_from(&DEFAULT_CENTER) <= 20.0)
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids(&result), expected);
        assert!(!ids(&result).contains(&"FAR".to_string()));
        assert!(!ids(&result).contains(&"OEFA-C".to_string()));
    }

    #[test]
    fn growing_the_radius_never_removes_points() {
        let points = sample_points();
        let config = MapConfig::default();
        let mut previous: Vec<String> = Vec::new();
        for radius in [1.0, 5.0, 10.0, 20.0, 50.0, 100.0] {
            let state = FilterState::new(DEFAULT_CENTER, radius);
            let current = ids(&apply(&points, &state, &config));
            assert!(previous.iter().all(|id| current.contains(id)), "radius {radius}");
            previous = current;
        }
    }

    #[test]
    fn radius_is_ignored_when_hidden_or_disabled() {
        let points = sample_points();
        let hidden = apply(&points, &FilterState::new(DEFAULT_CENTER, 1.0), &everything_off());
        assert_eq!(hidden.len(), points.len());
        let disabled = apply(
            &points,
            &FilterState::new(DEFAULT_CENTER, 1.0).without_radius(),
            &MapConfig::default(),
        );
        assert_eq!(disabled.len(), points.len());
    }

    #[test]
    fn date_range_is_inclusive_and_keeps_undated_points() {
        let points = sample_points();
        let state = FilterState::default()
            .without_radius()
            .with_date_range(DateRange::new(date(2018, 2, 15), date(2018, 2, 25)));
        let result = ids(&apply(&points, &state, &MapConfig::default()));
        assert!(result.contains(&"OEFA-A".to_string()));
        assert!(!result.contains(&"OEFA-B".to_string()));
        assert!(result.contains(&"OEFA-C".to_string()));
        assert!(result.contains(&"IE_001".to_string()));

        let edge = FilterState::default()
            .without_radius()
            .with_date_range(DateRange::new(date(2018, 2, 20), date(2018, 2, 20)));
        assert!(ids(&apply(&points, &edge, &MapConfig::default())).contains(&"OEFA-A".to_string()));
    }

    #[test]
    fn half_open_date_range_is_inactive() {
        let points = sample_points();
        let state = FilterState::default()
            .without_radius()
            .with_date_range(DateRange::new(date(2019, 1, 1), None));
        assert_eq!(apply(&points, &state, &MapConfig::default()).len(), points.len());
    }

    #[test]
    fn date_filter_respects_map_config() {
        let points = sample_points();
        let state = FilterState::default()
            .without_radius()
            .with_date_range(DateRange::new(date(2030, 1, 1), date(2030, 12, 31)));
        let basic = apply(&points, &state, &MapConfig::basic());
        assert_eq!(basic.len(), points.len());
    }

    #[test]
    fn report_all_equals_no_report_filter() {
        let points = sample_points();
        let with_all = apply(&points, &FilterState::default(), &MapConfig::default());
        let without = apply(
            &points,
            &FilterState::default(),
            &MapConfig {
                enable_report_filter: false,
                ..MapConfig::default()
            },
        );
        assert_eq!(ids(&with_all), ids(&without));
    }

    #[test]
    fn report_filter_matches_report_id_or_point_id() {
        let points = sample_points();
        let state = FilterState::default()
            .without_radius()
            .with_report(ReportSelection::Only("R1".into()));
        assert_eq!(
            ids(&apply(&points, &state, &MapConfig::default())),
            vec!["OEFA-A", "OEFA-B"]
        );
        let by_id = FilterState::default()
            .without_radius()
            .with_report(ReportSelection::Only("IE_003".into()));
        assert_eq!(ids(&apply(&points, &by_id, &MapConfig::default())), vec!["IE_003"]);
    }

    #[test]
    fn location_filter_is_case_insensitive() {
        let points = sample_points();
        let state = FilterState::default()
            .without_radius()
            .with_location(Some("  ica "));
        assert_eq!(ids(&apply(&points, &state, &MapConfig::default())), vec!["OEFA-C"]);
        let by_name = FilterState::default()
            .without_radius()
            .with_location(Some("eess"));
        assert_eq!(ids(&apply(&points, &by_name, &MapConfig::default())), vec!["EESS_001"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let points = sample_points();
        let state = FilterState::default()
            .with_category(CategorySelection::Only(Category::CausalityEvaluation))
            .with_date_range(DateRange::new(date(2018, 1, 1), date(2018, 12, 31)));
        let config = MapConfig::default();
        let once: Vec<MonitoringPoint> = apply(&points, &state, &config).into_iter().cloned().collect();
        let twice = apply(&once, &state, &config);
        assert_eq!(ids(&twice), once.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_result_is_valid() {
        let points = sample_points();
        let state = FilterState::default().with_location(Some("Cusco"));
        assert!(apply(&points, &state, &MapConfig::default()).is_empty());
        assert!(apply(&[], &state, &MapConfig::default()).is_empty());
    }

    #[test]
    fn summary_counts_per_category() {
        let points = sample_points();
        let visible = apply(&points, &FilterState::default(), &MapConfig::default());
        let summary = summarize(&visible, &DEFAULT_CENTER);
        assert_eq!(summary.total, visible.len());
        assert_eq!(summary.count(Category::Education), 2);
        assert_eq!(summary.count(Category::Health), 1);
        assert!(summary.nearest_km.unwrap() < 0.01);
    }

    #[test]
    fn active_stages_follow_state_and_config() {
        let state = FilterState::default()
            .with_category(CategorySelection::Only(Category::Health))
            .with_report(ReportSelection::Only("R1".into()));
        let stages = active_stages(&state, &MapConfig::basic());
        assert_eq!(stages, vec![FilterStage::Category, FilterStage::Radius]);
    }
}
