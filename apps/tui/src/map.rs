//! Map presentation model: which map features are on, how markers are
//! revealed, what the view should frame and what a marker popup shows.

use serde::Serialize;

use crate::domain::MonitoringPoint;
use crate::geo::{circle_polygon, Coordinate};

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_MAX_MARKERS: usize = 800;

/// One parametrized map replaces the basic, hackathon and full variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapConfig {
    pub show_radius: bool,
    pub batch_size: usize,
    pub enable_date_filter: bool,
    pub enable_report_filter: bool,
    pub max_markers: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            show_radius: true,
            batch_size: DEFAULT_BATCH_SIZE,
            enable_date_filter: true,
            enable_report_filter: true,
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }
}

impl MapConfig {
    /// Radius circle only, no sampling filters.
    pub const fn basic() -> Self {
        Self {
            show_radius: true,
            batch_size: DEFAULT_BATCH_SIZE,
            enable_date_filter: false,
            enable_report_filter: false,
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }

    /// Sampling filters without the radius overlay.
    pub const fn hackathon() -> Self {
        Self {
            show_radius: false,
            batch_size: DEFAULT_BATCH_SIZE,
            enable_date_filter: true,
            enable_report_filter: true,
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = if batch_size == 0 { 1 } else { batch_size };
        self
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "full" | "default" => Some(Self::default()),
            "basic" => Some(Self::basic()),
            "hackathon" => Some(Self::hackathon()),
            _ => None,
        }
    }
}

/// Reveals markers a batch at a time, one batch per UI tick.
///
/// Every reset bumps the generation, so a reveal that was in flight for an
/// older filter result simply stops counting toward the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerBatcher {
    batch_size: usize,
    total: usize,
    revealed: usize,
    generation: u64,
}

impl MarkerBatcher {
    pub const fn new(batch_size: usize) -> Self {
        Self {
            batch_size: if batch_size == 0 { 1 } else { batch_size },
            total: 0,
            revealed: 0,
            generation: 0,
        }
    }

    /// Starts a new reveal of `total` markers. The first batch shows immediately.
    pub fn reset(&mut self, total: usize) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.total = total;
        self.revealed = self.batch_size.min(total);
        self.generation
    }

    /// Reveals the next batch. Returns `false` once everything is visible.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.revealed = (self.revealed + self.batch_size).min(self.total);
        true
    }

    /// Advances only if `generation` is still the current one.
    pub fn advance_generation(&mut self, generation: u64) -> bool {
        generation == self.generation && self.advance()
    }

    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }

    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.revealed as f64 / self.total as f64;
        ratio
    }
}

/// Latitude/longitude rectangle framed by the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Smallest span in degrees, so a single marker still gets a readable view.
const MIN_SPAN_DEG: f64 = 0.05;
const FALLBACK_RADIUS_KM: f64 = 50.0;

impl ViewBounds {
    pub fn around(center: &Coordinate, radius_km: f64) -> Self {
        Self::fit(circle_polygon(center, radius_km, 36)).unwrap_or(Self {
            min_lat: center.lat,
            max_lat: center.lat,
            min_lng: center.lng,
            max_lng: center.lng,
        })
    }

    pub fn fit(coordinates: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        coordinates
            .into_iter()
            .filter(Coordinate::is_valid)
            .fold(None, |bounds: Option<Self>, c| {
                Some(bounds.map_or(
                    Self {
                        min_lat: c.lat,
                        max_lat: c.lat,
                        min_lng: c.lng,
                        max_lng: c.lng,
                    },
                    |b| Self {
                        min_lat: b.min_lat.min(c.lat),
                        max_lat: b.max_lat.max(c.lat),
                        min_lng: b.min_lng.min(c.lng),
                        max_lng: b.max_lng.max(c.lng),
                    },
                ))
            })
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// Grows each side by `fraction` of the span, clamped to the globe.
    #[must_use]
    pub fn padded(self, fraction: f64) -> Self {
        let lat_span = (self.max_lat - self.min_lat).max(MIN_SPAN_DEG);
        let lng_span = (self.max_lng - self.min_lng).max(MIN_SPAN_DEG);
        let mid_lat = (self.min_lat + self.max_lat) / 2.0;
        let mid_lng = (self.min_lng + self.max_lng) / 2.0;
        let half_lat = lat_span.mul_add(fraction, lat_span / 2.0);
        let half_lng = lng_span.mul_add(fraction, lng_span / 2.0);
        Self {
            min_lat: (mid_lat - half_lat).max(-90.0),
            max_lat: (mid_lat + half_lat).min(90.0),
            min_lng: (mid_lng - half_lng).max(-180.0),
            max_lng: (mid_lng + half_lng).min(180.0),
        }
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat) && (self.min_lng..=self.max_lng).contains(&c.lng)
    }

    pub const fn x_bounds(&self) -> [f64; 2] {
        [self.min_lng, self.max_lng]
    }

    pub const fn y_bounds(&self) -> [f64; 2] {
        [self.min_lat, self.max_lat]
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// View that frames the visible markers and, when shown, the radius circle.
pub fn fit_view(
    points: &[&MonitoringPoint],
    center: &Coordinate,
    radius_km: f64,
    radius_visible: bool,
) -> ViewBounds {
    let markers = ViewBounds::fit(points.iter().map(|p| p.coordinate()));
    let circle = radius_visible.then(|| ViewBounds::around(center, radius_km));

    let bounds = match (markers, circle) {
        (Some(m), Some(c)) => m.union(c),
        (Some(m), None) => m,
        (None, Some(c)) => c,
        (None, None) => ViewBounds::around(center, FALLBACK_RADIUS_KM),
    };
    bounds.padded(0.1)
}

/// Label/value rows of a marker popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPopup {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl MarkerPopup {
    pub fn for_point(point: &MonitoringPoint, center: &Coordinate, show_distance: bool) -> Self {
        let mut rows = vec![
            ("ID".to_string(), point.id.clone()),
            ("Category".to_string(), point.category.label().to_string()),
        ];
        if let Some(report) = &point.report_id {
            rows.push(("Report".to_string(), report.clone()));
        }
        if let Some(parameter) = &point.parameter {
            rows.push(("Parameter".to_string(), parameter.clone()));
        }
        if let Some(date) = point.sample_date {
            rows.push(("Sample date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(location) = &point.location {
            rows.push(("Location".to_string(), location.clone()));
        }
        rows.push(("Coordinates".to_string(), point.coordinate().to_string()));
        if show_distance {
            rows.push((
                "Distance".to_string(),
                format!("{:.2} km", point.distance_from(center)),
            ));
        }
        Self {
            title: point.name.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, DEFAULT_CENTER};

    #[test]
    fn presets_match_the_variants() {
        let basic = MapConfig::basic();
        assert!(basic.show_radius && !basic.enable_date_filter && !basic.enable_report_filter);
        let hackathon = MapConfig::hackathon();
        assert!(!hackathon.show_radius && hackathon.enable_date_filter);
        assert_eq!(MapConfig::preset("FULL"), Some(MapConfig::default()));
        assert_eq!(MapConfig::preset("nope"), None);
        assert_eq!(MapConfig::default().with_batch_size(0).batch_size, 1);
    }

    #[test]
    fn batcher_reveals_in_batches() {
        let mut batcher = MarkerBatcher::new(50);
        batcher.reset(120);
        assert_eq!(batcher.revealed(), 50);
        assert!(batcher.advance());
        assert_eq!(batcher.revealed(), 100);
        assert!(batcher.advance());
        assert_eq!(batcher.revealed(), 120);
        assert!(batcher.is_complete());
        assert!(!batcher.advance());
    }

    #[test]
    fn reset_cancels_in_flight_reveal() {
        let mut batcher = MarkerBatcher::new(10);
        let stale = batcher.reset(100);
        batcher.advance();
        let fresh = batcher.reset(30);
        assert_ne!(stale, fresh);
        assert_eq!(batcher.revealed(), 10);
        assert!(!batcher.advance_generation(stale));
        assert_eq!(batcher.revealed(), 10);
        assert!(batcher.advance_generation(fresh));
        assert_eq!(batcher.revealed(), 20);
    }

    #[test]
    fn empty_reveal_is_complete() {
        let mut batcher = MarkerBatcher::new(50);
        batcher.reset(0);
        assert!(batcher.is_complete());
        assert!((batcher.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn view_contains_markers_and_radius() {
        let far = MonitoringPoint::new(
            "FAR",
            Category::Health,
            Coordinate::new(-11.0, -77.5),
            "far",
        )
        .unwrap();
        let view = fit_view(&[&far], &DEFAULT_CENTER, 20.0, true);
        assert!(view.contains(&far.coordinate()));
        for edge in circle_polygon(&DEFAULT_CENTER, 20.0, 8) {
            assert!(view.contains(&edge));
        }
    }

    #[test]
    fn view_without_points_frames_the_center() {
        let view = fit_view(&[], &DEFAULT_CENTER, 20.0, false);
        assert!(view.contains(&DEFAULT_CENTER));
        assert!(view.max_lat - view.min_lat > 0.5);
    }

    #[test]
    fn single_point_gets_minimum_span() {
        let view = ViewBounds::fit([DEFAULT_CENTER]).unwrap().padded(0.0);
        assert!((view.max_lat - view.min_lat - MIN_SPAN_DEG).abs() < 1e-9);
    }

    #[test]
    fn popup_shows_distance_only_when_requested() {
        let point = MonitoringPoint::new(
            "OEFA-004",
            Category::CausalityEvaluation,
            DEFAULT_CENTER,
            "Punto OEFA - Casma Central",
        )
        .unwrap()
        .with_sample(Some("2BAE"), Some("NITRITOS (NO2-N)"), chrono::NaiveDate::from_ymd_opt(2018, 2, 20));
        let with = MarkerPopup::for_point(&point, &DEFAULT_CENTER, true);
        assert!(with.rows.iter().any(|(k, v)| k == "Distance" && v == "0.00 km"));
        assert!(with.rows.iter().any(|(k, v)| k == "Sample date" && v == "2018-02-20"));
        let without = MarkerPopup::for_point(&point, &DEFAULT_CENTER, false);
        assert!(without.rows.iter().all(|(k, _)| k != "Distance"));
    }
}
