use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Dashboard default center, the Casma central sampling station.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(-11.525, -76.975);
pub const DEFAULT_RADIUS_KM: f64 = 20.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 100.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("coordinate ({lat}, {lng}) is outside WGS84 range")]
    CoordinateOutOfRange { lat: f64, lng: f64 },
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "oefa", alias = "causalidad", alias = "causality")]
    CausalityEvaluation,
    #[serde(rename = "educacion", alias = "education")]
    Education,
    #[serde(rename = "salud", alias = "health")]
    Health,
    #[serde(rename = "poblacion", alias = "population")]
    Population,
}

impl Category {
    pub const ALL: [Self; 4] = [
        Self::CausalityEvaluation,
        Self::Education,
        Self::Health,
        Self::Population,
    ];

    /// Wire name used by the monitoring API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CausalityEvaluation => "oefa",
            Self::Education => "educacion",
            Self::Health => "salud",
            Self::Population => "poblacion",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::CausalityEvaluation),
            1 => Some(Self::Education),
            2 => Some(Self::Health),
            3 => Some(Self::Population),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::CausalityEvaluation => 0,
            Self::Education => 1,
            Self::Health => 2,
            Self::Population => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "oefa" | "causalidad" | "causality" | "evaluacion_causalidad" => {
                Some(Self::CausalityEvaluation)
            }
            "educacion" | "educación" | "education" => Some(Self::Education),
            "salud" | "health" => Some(Self::Health),
            "poblacion" | "población" | "population" => Some(Self::Population),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CausalityEvaluation => "Causality evaluation",
            Self::Education => "Education",
            Self::Health => "Health",
            Self::Population => "Population",
        }
    }

    pub const fn short_label(self) -> &'static str {
        match self {
            Self::CausalityEvaluation => "OEFA",
            Self::Education => "Edu",
            Self::Health => "Health",
            Self::Population => "Pop",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

/// Parses a sampling date, returning `None` for anything malformed.
pub fn parse_sample_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    // Some sheets carry a timestamp after the date.
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_sample_date))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(clean_text))
}

/// Strict parse for dates typed into a filter, unlike the lenient fixture parser.
pub fn parse_filter_date(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(raw.trim().to_string()))
}

/// Trims a free-text field, mapping blanks and dataframe null markers to `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "" | "nan" | "none" | "null" => None,
        _ => Some(trimmed.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringPoint {
    pub id: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub sample_date: Option<NaiveDate>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl MonitoringPoint {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        coordinate: Coordinate,
        name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !coordinate.is_valid() {
            return Err(DomainError::CoordinateOutOfRange {
                lat: coordinate.lat,
                lng: coordinate.lng,
            });
        }
        Ok(Self {
            id: id.into(),
            category,
            latitude: coordinate.lat,
            longitude: coordinate.lng,
            report_id: None,
            parameter: None,
            sample_date: None,
            name: name.into(),
            location: None,
            details: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_sample(
        mut self,
        report_id: Option<&str>,
        parameter: Option<&str>,
        sample_date: Option<NaiveDate>,
    ) -> Self {
        self.report_id = report_id.and_then(clean_text);
        self.parameter = parameter.and_then(clean_text);
        self.sample_date = sample_date;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = clean_text(location);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn has_valid_coordinate(&self) -> bool {
        self.coordinate().is_valid()
    }

    pub fn distance_from(&self, center: &Coordinate) -> f64 {
        center.distance_km(&self.coordinate())
    }

    /// A point belongs to a report when either its report id or its own id match.
    pub fn matches_report(&self, report: &str) -> bool {
        self.report_id.as_deref() == Some(report) || self.id == report
    }

    /// Measured value against its regulatory limit, when the sheet carries both.
    pub fn measurement(&self) -> Option<Measurement> {
        let value = self.details.get("valor")?.trim().parse::<f64>().ok()?;
        let limit = self.details.get("limite")?.trim().parse::<f64>().ok()?;
        Some(Measurement {
            value,
            limit,
            unit: self.details.get("unidad").cloned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub limit: f64,
    pub unit: Option<String>,
}

impl Measurement {
    pub fn exceedance(&self) -> Option<f64> {
        (self.limit > 0.0).then(|| self.value / self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Only(Category),
}

impl CategorySelection {
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All categories",
            Self::Only(category) => category.label(),
        }
    }

    /// Cycles All -> each category -> All.
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Category::CausalityEvaluation),
            Self::Only(category) => match Category::from_index(category.index() + 1) {
                Some(next) => Self::Only(next),
                None => Self::All,
            },
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::All => Self::Only(Category::Population),
            Self::Only(Category::CausalityEvaluation) => Self::All,
            Self::Only(category) => match Category::from_index(category.index() - 1) {
                Some(previous) => Self::Only(previous),
                None => Self::All,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportSelection {
    #[default]
    All,
    Only(String),
}

impl ReportSelection {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(id) => Some(id),
        }
    }

    pub fn label(&self) -> &str {
        self.as_option().unwrap_or("All reports")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Both bounds, only when the range is fully specified.
    pub const fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds()
            .is_none_or(|(start, end)| start <= date && date <= end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub center: Coordinate,
    pub radius_km: f64,
    pub radius_enabled: bool,
    pub category: CategorySelection,
    pub report: ReportSelection,
    pub date_range: DateRange,
    pub location: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_RADIUS_KM)
    }
}

impl FilterState {
    pub fn new(center: Coordinate, radius_km: f64) -> Self {
        Self {
            center,
            radius_km: radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM),
            radius_enabled: true,
            category: CategorySelection::All,
            report: ReportSelection::All,
            date_range: DateRange::default(),
            location: None,
        }
    }

    #[must_use]
    pub const fn with_category(mut self, category: CategorySelection) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_report(mut self, report: ReportSelection) -> Self {
        self.report = report;
        self
    }

    #[must_use]
    pub const fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.location = location.and_then(clean_text);
        self
    }

    #[must_use]
    pub const fn without_radius(mut self) -> Self {
        self.radius_enabled = false;
        self
    }

    pub fn set_radius(&mut self, radius_km: f64) {
        self.radius_km = radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_filter_dates_are_strict() {
        assert_eq!(parse_filter_date(" 2018-02-20 "), Ok(NaiveDate::from_ymd_opt(2018, 2, 20).unwrap()));
        assert_eq!(
            parse_filter_date("20/02/2018"),
            Err(DomainError::InvalidDate("20/02/2018".to_string()))
        );
    }

    #[test]
    fn category_wire_names_round_trip_through_parse() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
            assert_eq!(Category::from_index(category.index()), Some(category));
        }
        assert_eq!(Category::parse(" Causalidad "), Some(Category::CausalityEvaluation));
        assert!("rivers".parse::<Category>().is_err());
    }

    #[test]
    fn category_selection_cycles_through_all() {
        let mut selection = CategorySelection::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            selection = selection.next();
            seen.push(selection);
        }
        assert_eq!(seen[3], CategorySelection::Only(Category::Population));
        assert_eq!(seen[4], CategorySelection::All);
        assert_eq!(CategorySelection::All.previous().next(), CategorySelection::All);
        assert_eq!(
            CategorySelection::Only(Category::Education).previous(),
            CategorySelection::Only(Category::CausalityEvaluation)
        );
    }

    #[test]
    fn sample_dates_are_lenient() {
        assert_eq!(
            parse_sample_date("2018-02-20"),
            NaiveDate::from_ymd_opt(2018, 2, 20)
        );
        assert_eq!(
            parse_sample_date("2018-02-20T10:15:00"),
            NaiveDate::from_ymd_opt(2018, 2, 20)
        );
        assert_eq!(
            parse_sample_date("20/02/2018"),
            NaiveDate::from_ymd_opt(2018, 2, 20)
        );
        assert_eq!(parse_sample_date("nan"), None);
        assert_eq!(parse_sample_date("2018-13-40"), None);
    }

    #[test]
    fn point_rejects_out_of_range_coordinates() {
        let err = MonitoringPoint::new("X", Category::Health, Coordinate::new(95.0, 0.0), "bad")
            .unwrap_err();
        assert!(matches!(err, DomainError::CoordinateOutOfRange { .. }));
    }

    #[test]
    fn malformed_optional_fields_deserialize_to_none() {
        let point: MonitoringPoint = serde_json::from_str(
            r#"{
                "id": "OEFA-X",
                "category": "oefa",
                "latitude": -11.5,
                "longitude": -76.9,
                "report_id": "  ",
                "parameter": "nan",
                "sample_date": "not a date",
                "name": "Sample"
            }"#,
        )
        .unwrap();
        assert_eq!(point.report_id, None);
        assert_eq!(point.parameter, None);
        assert_eq!(point.sample_date, None);
        assert_eq!(point.location, None);
    }

    #[test]
    fn measurement_exceedance() {
        let point = MonitoringPoint::new("L1", Category::CausalityEvaluation, DEFAULT_CENTER, "L")
            .unwrap()
            .with_detail("valor", "1.24")
            .with_detail("limite", "0.1")
            .with_detail("unidad", "mg/L");
        let measurement = point.measurement().unwrap();
        assert!((measurement.exceedance().unwrap() - 12.4).abs() < 1e-9);
        assert_eq!(measurement.unit.as_deref(), Some("mg/L"));
    }

    #[test]
    fn date_range_needs_both_bounds() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let open = DateRange::new(NaiveDate::from_ymd_opt(2021, 1, 1), None);
        assert!(open.contains(date));
        let closed = DateRange::new(
            NaiveDate::from_ymd_opt(2021, 1, 1),
            NaiveDate::from_ymd_opt(2021, 12, 31),
        );
        assert!(!closed.contains(date));
    }

    #[test]
    fn radius_is_clamped() {
        let mut state = FilterState::default();
        state.set_radius(500.0);
        assert!((state.radius_km - MAX_RADIUS_KM).abs() < f64::EPSILON);
        state.set_radius(0.0);
        assert!((state.radius_km - MIN_RADIUS_KM).abs() < f64::EPSILON);
    }
}
