use crate::app::actions::AppActions;
use crate::config::AppConfig;
use crate::domain::{parse_filter_date, DateRange, FilterState, MonitoringPoint, ReportSelection};
use crate::filter::{self, FilterSummary};
use crate::map::MarkerBatcher;
use crate::report::{ReportGenerator, ReportRequest, ReportStatus, ReportTask};
use crate::risk::RiskThermometer;
use crate::source::{FilterOptions, PointDetail, PointQuery, PointSource, SourceStats};
use chrono::{Duration as DateDelta, NaiveDate};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use throbber_widgets_tui::ThrobberState;

pub const RADIUS_STEP_KM: f64 = 5.0;
pub const RISK_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Dashboard,
    Points,
    PointDetail,
    Report,
}

/// Filter controls of the dashboard panel, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Report,
    DateFrom,
    DateTo,
    Location,
    Radius,
}

impl FilterField {
    pub const ALL: [Self; 6] = [
        Self::Category,
        Self::Report,
        Self::DateFrom,
        Self::DateTo,
        Self::Location,
        Self::Radius,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Report => "Report",
            Self::DateFrom => "From",
            Self::DateTo => "To",
            Self::Location => "Location",
            Self::Radius => "Radius",
        }
    }

    /// Fields that accept typed text on Enter.
    pub const fn is_text_entry(self) -> bool {
        matches!(
            self,
            Self::Report | Self::DateFrom | Self::DateTo | Self::Location
        )
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub show_help: bool,
    pub status_message: String,
    pub config: AppConfig,
    pub actions: AppActions,
    pub report_generator: Arc<dyn ReportGenerator>,
    pub points: Vec<MonitoringPoint>,
    pub filters: FilterState,
    pub stats: Option<SourceStats>,
    pub options: FilterOptions,
    pub report_ids: Vec<String>,
    pub load_state: LoadState,
    pub focused_field: FilterField,
    pub editing: bool,
    pub edit_buffer: String,
    pub selected_point_index: usize,
    pub search_active: bool,
    pub search_query: String,
    pub detail: Option<PointDetail>,
    pub detail_error: Option<String>,
    pub batcher: MarkerBatcher,
    /// Reveal started by the latest filter change.
    pub reveal_generation: u64,
    pub report: ReportTask,
    pub report_scroll: u16,
    pub thermometer: RiskThermometer,
    pub chart_tab_index: usize,
    pub animation_counter: f64,
    pub animation_paused: bool,
    pub throbber: ThrobberState,
    pub last_frame: Instant,
}

impl App {
    pub fn new(
        config: AppConfig,
        source: Arc<dyn PointSource>,
        report_generator: Arc<dyn ReportGenerator>,
    ) -> Self {
        let filters = config.initial_filters();
        let batcher = MarkerBatcher::new(config.map.batch_size);
        let actions = AppActions::new(source, config.point_limit);
        Self {
            running: true,
            screen: AppScreen::Dashboard,
            show_help: false,
            status_message: String::new(),
            config,
            actions,
            report_generator,
            points: Vec::new(),
            filters,
            stats: None,
            options: FilterOptions::default(),
            report_ids: Vec::new(),
            load_state: LoadState::Idle,
            focused_field: FilterField::Category,
            editing: false,
            edit_buffer: String::new(),
            selected_point_index: 0,
            search_active: false,
            search_query: String::new(),
            detail: None,
            detail_error: None,
            batcher,
            reveal_generation: 0,
            report: ReportTask::new(),
            report_scroll: 0,
            thermometer: RiskThermometer::default(),
            chart_tab_index: 0,
            animation_counter: 0.0,
            animation_paused: false,
            throbber: ThrobberState::default(),
            last_frame: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub const fn radius_applied(&self) -> bool {
        self.config.map.show_radius && self.filters.radius_enabled
    }

    /// Candidates that survive the filter pipeline.
    pub fn visible_points(&self) -> Vec<&MonitoringPoint> {
        filter::apply(&self.points, &self.filters, &self.config.map)
    }

    /// Visible points the map has revealed so far, capped at `max_markers`.
    pub fn revealed_points(&self) -> Vec<&MonitoringPoint> {
        let mut visible = self.visible_points();
        visible.truncate(self.batcher.revealed());
        visible
    }

    pub fn summary(&self) -> FilterSummary {
        filter::summarize(&self.visible_points(), &self.filters.center)
    }

    /// Visible points narrowed by the fuzzy search, best match first.
    pub fn listed_points(&self) -> Vec<&MonitoringPoint> {
        let visible = self.visible_points();
        let query = self.search_query.trim();
        if query.is_empty() {
            return visible;
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &MonitoringPoint)> = visible
            .into_iter()
            .filter_map(|point| {
                let by_name = matcher.fuzzy_match(&point.name, query);
                let by_id = matcher.fuzzy_match(&point.id, query);
                by_name.max(by_id).map(|score| (score, point))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, point)| point).collect()
    }

    pub fn selected_point(&self) -> Option<&MonitoringPoint> {
        self.listed_points().get(self.selected_point_index).copied()
    }

    /// Restarts the marker reveal for the new filter result.
    pub fn on_filters_changed(&mut self) {
        let visible = self.visible_points().len();
        let generation = self
            .batcher
            .reset(visible.min(self.config.map.max_markers));
        self.reveal_generation = generation;
        self.selected_point_index = 0;
        tracing::debug!(visible, generation, "filters changed");
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if !self.animation_paused {
            self.animation_counter += delta.as_secs_f64() * 2.0;
            if self.animation_counter > 2.0 * std::f64::consts::PI {
                self.animation_counter -= 2.0 * std::f64::consts::PI;
            }
        }

        self.batcher.advance_generation(self.reveal_generation);

        if self.report.is_pending() {
            self.throbber.calc_next();
        }
        if self.report.poll() {
            self.status_message = match self.report.status() {
                ReportStatus::Resolved(report) => {
                    format!("Report ready: overall risk {}", report.risk.label())
                }
                ReportStatus::Failed(reason) => format!("Report failed: {reason}"),
                other => format!("Report {}", other.name()),
            };
        }
    }

    pub fn reset(&mut self) {
        self.filters = self.config.initial_filters();
        self.focused_field = FilterField::Category;
        self.editing = false;
        self.edit_buffer.clear();
        self.search_active = false;
        self.search_query.clear();
        self.thermometer = RiskThermometer::default();
        self.chart_tab_index = 0;
        self.status_message = "Filters reset".to_string();
        self.on_filters_changed();
    }

    pub fn toggle_animation_pause(&mut self) {
        self.animation_paused = !self.animation_paused;
    }

    /// Left/Right on the focused field.
    pub fn adjust_focused(&mut self, forward: bool) {
        let delta: i64 = if forward { 1 } else { -1 };
        match self.focused_field {
            FilterField::Category => self.cycle_category(forward),
            FilterField::Report => self.cycle_report(forward),
            FilterField::DateFrom | FilterField::DateTo => {
                self.shift_date(self.focused_field, delta);
            }
            FilterField::Location => self.cycle_location(forward),
            FilterField::Radius => self.adjust_radius(if forward { 1.0 } else { -1.0 }),
        }
    }

    pub fn cycle_category(&mut self, forward: bool) {
        self.filters.category = if forward {
            self.filters.category.next()
        } else {
            self.filters.category.previous()
        };
        self.on_filters_changed();
    }

    /// Steps through `All` followed by the known report ids.
    pub fn cycle_report(&mut self, forward: bool) {
        if !self.config.map.enable_report_filter {
            self.status_message = "Report filter is disabled in this preset".to_string();
            return;
        }
        let slots = self.report_ids.len() + 1;
        let current = match self.filters.report.as_option() {
            Some(id) => self
                .report_ids
                .iter()
                .position(|known| known == id)
                .map_or(0, |i| i + 1),
            None => 0,
        };
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.filters.report = match next {
            0 => ReportSelection::All,
            i => ReportSelection::Only(self.report_ids[i - 1].clone()),
        };
        self.on_filters_changed();
    }

    fn cycle_location(&mut self, forward: bool) {
        let slots = self.options.locations.len() + 1;
        let current = self
            .filters
            .location
            .as_ref()
            .and_then(|l| self.options.locations.iter().position(|known| known == l))
            .map_or(0, |i| i + 1);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        let location = match next {
            0 => None,
            i => Some(self.options.locations[i - 1].as_str()),
        };
        self.filters = self.filters.clone().with_location(location);
        self.on_filters_changed();
    }

    /// Moves one end of the date range by `days`. An unset end starts from
    /// the nearest sampled date.
    pub fn shift_date(&mut self, field: FilterField, days: i64) {
        if !self.config.map.enable_date_filter {
            self.status_message = "Date filter is disabled in this preset".to_string();
            return;
        }
        let (earliest, latest) = self.sampled_span();
        let range = self.filters.date_range;
        let Some(shifted) = (match field {
            FilterField::DateFrom => range.start.or(earliest),
            _ => range.end.or(latest),
        })
        .and_then(|date| date.checked_add_signed(DateDelta::days(days))) else {
            self.status_message = "No sampled dates to start from".to_string();
            return;
        };

        let candidate = match field {
            FilterField::DateFrom => DateRange::new(Some(shifted), range.end),
            _ => DateRange::new(range.start, Some(shifted)),
        };
        self.set_date_range(candidate);
    }

    fn sampled_span(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let dates = self.points.iter().filter_map(|p| p.sample_date);
        (dates.clone().min(), dates.max())
    }

    fn set_date_range(&mut self, range: DateRange) -> bool {
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                self.status_message = format!("Start date {start} is after end date {end}");
                return false;
            }
        }
        self.filters.date_range = range;
        self.on_filters_changed();
        true
    }

    pub fn adjust_radius(&mut self, delta_km: f64) {
        if !self.config.map.show_radius {
            self.status_message = "Radius is hidden in this preset".to_string();
            return;
        }
        self.filters.set_radius(self.filters.radius_km + delta_km);
        self.on_filters_changed();
    }

    pub fn toggle_radius(&mut self) {
        self.filters.radius_enabled = !self.filters.radius_enabled;
        self.status_message = if self.filters.radius_enabled {
            format!("Radius filter on ({:.0} km)", self.filters.radius_km)
        } else {
            "Radius filter off".to_string()
        };
        self.on_filters_changed();
    }

    pub fn begin_edit(&mut self) {
        if !self.focused_field.is_text_entry() {
            return;
        }
        self.edit_buffer = match self.focused_field {
            FilterField::Report => self
                .filters
                .report
                .as_option()
                .map(String::from)
                .unwrap_or_default(),
            FilterField::DateFrom => format_date(self.filters.date_range.start),
            FilterField::DateTo => format_date(self.filters.date_range.end),
            FilterField::Location => self.filters.location.clone().unwrap_or_default(),
            FilterField::Category | FilterField::Radius => String::new(),
        };
        self.editing = true;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    /// Applies the edit buffer to the focused field. Blank clears it.
    pub fn commit_edit(&mut self) {
        let text = std::mem::take(&mut self.edit_buffer);
        self.editing = false;
        let text = text.trim();

        match self.focused_field {
            FilterField::Report => {
                self.filters.report = ReportSelection::parse(text);
                self.on_filters_changed();
            }
            FilterField::DateFrom | FilterField::DateTo => {
                let date = if text.is_empty() {
                    None
                } else {
                    match parse_filter_date(text) {
                        Ok(date) => Some(date),
                        Err(e) => {
                            self.status_message = e.to_string();
                            return;
                        }
                    }
                };
                let range = self.filters.date_range;
                let candidate = if self.focused_field == FilterField::DateFrom {
                    DateRange::new(date, range.end)
                } else {
                    DateRange::new(range.start, date)
                };
                self.set_date_range(candidate);
            }
            FilterField::Location => {
                self.filters = self.filters.clone().with_location(Some(text));
                self.on_filters_changed();
            }
            FilterField::Category | FilterField::Radius => {}
        }
    }

    pub fn clear_field(&mut self) {
        match self.focused_field {
            FilterField::Category => self.filters.category = Default::default(),
            FilterField::Report => self.filters.report = ReportSelection::All,
            FilterField::DateFrom => self.filters.date_range.start = None,
            FilterField::DateTo => self.filters.date_range.end = None,
            FilterField::Location => self.filters.location = None,
            FilterField::Radius => self.filters.set_radius(self.config.radius_km),
        }
        self.on_filters_changed();
    }

    /// Starts report generation for the current view and opens the popup.
    pub fn request_report(&mut self) {
        let request = ReportRequest::from_view(
            &self.filters,
            self.radius_applied(),
            &self.visible_points(),
            self.thermometer.score(),
        );
        if !self.report.is_pending() && !matches!(self.report.status(), ReportStatus::Idle) {
            self.report.reset();
        }
        match self.report.start(Arc::clone(&self.report_generator), request) {
            Ok(()) => {
                self.report_scroll = 0;
                self.status_message = "Generating report...".to_string();
            }
            Err(e) => self.status_message = e.to_string(),
        }
        self.screen = AppScreen::Report;
    }

    /// Closes the report popup. A pending report keeps running.
    pub fn close_report(&mut self) {
        if !self.report.is_pending() {
            self.report.reset();
        }
        self.screen = AppScreen::Dashboard;
    }

    /// Reloads candidates, stats and filter options from the source.
    pub async fn refresh(&mut self) {
        self.load_state = LoadState::Loading;
        let query = PointQuery::candidates(&self.filters, self.actions.point_limit);

        match self.actions.load_candidates(&query).await {
            Ok(points) => {
                self.report_ids = points
                    .iter()
                    .filter_map(|p| p.report_id.clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                self.points = points;
                self.load_state = LoadState::Ready;
                self.status_message = format!(
                    "Loaded {} points from {}",
                    self.points.len(),
                    self.actions.source_name()
                );
            }
            Err(e) => {
                tracing::error!("{e:#}");
                self.load_state = LoadState::Failed(format!("{e:#}"));
                self.status_message = format!("{e:#}");
            }
        }

        match self.actions.load_stats().await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => tracing::warn!("{e:#}"),
        }
        match self.actions.load_filter_options().await {
            Ok(options) => self.options = options,
            Err(e) => tracing::warn!("{e:#}"),
        }

        self.on_filters_changed();
    }

    /// Fetches the detail of the selected point and switches to its screen.
    pub async fn open_selected_detail(&mut self) {
        let Some((category, id)) = self.selected_point().map(|p| (p.category, p.id.clone())) else {
            self.status_message = "No point selected".to_string();
            return;
        };

        match self.actions.load_detail(category, &id).await {
            Ok(detail) => {
                self.detail = Some(detail);
                self.detail_error = None;
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                self.detail = None;
                self.detail_error = Some(format!("{e:#}"));
            }
        }
        self.screen = AppScreen::PointDetail;
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
