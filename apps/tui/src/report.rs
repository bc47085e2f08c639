//! Environmental report generation behind an async task.
//!
//! The dashboard never blocks on a report: [`ReportTask`] spawns the
//! generator on the runtime and the event loop polls it every tick.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::{Category, DateRange, FilterState, MonitoringPoint};
use crate::geo::Coordinate;
use crate::risk::RiskLevel;

pub const DEFAULT_REPORT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("no monitoring points in view to report on")]
    Empty,
    #[error("report generator failed: {0}")]
    Generator(String),
    #[error("report task ended without a result")]
    Aborted,
}

/// Snapshot of the dashboard view a report is generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub report_id: Option<String>,
    pub center: Coordinate,
    pub radius_km: Option<f64>,
    pub date_range: DateRange,
    pub risk_score: u8,
    pub points: Vec<MonitoringPoint>,
}

impl ReportRequest {
    pub fn from_view(
        state: &FilterState,
        radius_applied: bool,
        points: &[&MonitoringPoint],
        risk_score: u8,
    ) -> Self {
        Self {
            report_id: state.report.as_option().map(String::from),
            center: state.center,
            radius_km: radius_applied.then_some(state.radius_km),
            date_range: state.date_range,
            risk_score,
            points: points.iter().map(|p| (*p).clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub report_id: Option<String>,
    pub risk: RiskLevel,
    pub sample_count: usize,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push('\n');
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.heading);
            out.push('\n');
            for line in &section.lines {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[async_trait]
pub trait ReportGenerator: Send + Sync + fmt::Debug {
    async fn generate(&self, request: ReportRequest) -> Result<Report, ReportError>;
}

/// Stand-in for an AI backend: waits, then composes the report locally.
#[derive(Debug, Clone)]
pub struct SimulatedReportGenerator {
    delay: Duration,
}

impl Default for SimulatedReportGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_DELAY)
    }
}

impl SimulatedReportGenerator {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl ReportGenerator for SimulatedReportGenerator {
    async fn generate(&self, request: ReportRequest) -> Result<Report, ReportError> {
        tracing::info!(points = request.points.len(), delay = ?self.delay, "generating report");
        tokio::time::sleep(self.delay).await;
        compose(&request)
    }
}

fn date_span(points: &[MonitoringPoint]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = points.iter().filter_map(|p| p.sample_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn recommendations(level: RiskLevel) -> Vec<String> {
    let mut lines = vec![
        "Extend monitoring upstream and downstream of the sampled points to bound the affected \
         reach."
            .to_string(),
    ];
    if level >= RiskLevel::Medium {
        lines.push(
            "Inspect nearby farmland and industrial sites to identify the emission sources."
                .to_string(),
        );
    }
    if level >= RiskLevel::High {
        lines.push(
            "Suspend discharges temporarily and start remediation (bioremediation or \
             phytoremediation)."
                .to_string(),
        );
        lines.push(
            "Notify health and education facilities within the area of influence.".to_string(),
        );
    }
    lines.push(
        "Repeat sampling periodically over the next six months to verify corrective actions."
            .to_string(),
    );
    lines
}

/// Builds the report text from the requested view.
pub fn compose(request: &ReportRequest) -> Result<Report, ReportError> {
    if request.points.is_empty() {
        return Err(ReportError::Empty);
    }

    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    let mut parameters: BTreeMap<&str, usize> = BTreeMap::new();
    for point in &request.points {
        *counts.entry(point.category).or_insert(0) += 1;
        if let Some(parameter) = point.parameter.as_deref() {
            *parameters.entry(parameter).or_insert(0) += 1;
        }
    }

    let mut general = vec![
        format!(
            "Inspection report: {}",
            request.report_id.as_deref().unwrap_or("all reports in view")
        ),
        match request.radius_km {
            Some(radius) => format!("Area: {radius:.0} km around {}", request.center),
            None => format!("Area: all points, distances from {}", request.center),
        },
    ];
    if let Some((from, to)) = request.date_range.bounds() {
        general.push(format!("Requested period: {from} to {to}"));
    }
    general.push(match date_span(&request.points) {
        Some((from, to)) => format!("Sampling period: {from} to {to}"),
        None => "Sampling period: no dated samples".to_string(),
    });
    general.push(format!(
        "Monitoring points: {} ({})",
        request.points.len(),
        Category::ALL
            .iter()
            .map(|c| format!("{} {}", counts[c], c.label().to_lowercase()))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let mut technical: Vec<String> = parameters
        .iter()
        .map(|(parameter, n)| format!("{parameter}: {n} sample(s)"))
        .collect();
    let mut worst_measured: Option<RiskLevel> = None;
    for point in &request.points {
        let Some(measurement) = point.measurement() else {
            continue;
        };
        let Some(level) = RiskLevel::from_exceedance(measurement.value, measurement.limit) else {
            continue;
        };
        worst_measured = worst_measured.max(Some(level));
        let unit = measurement.unit.as_deref().unwrap_or("");
        technical.push(format!(
            "{}: {} {unit} against a limit of {} {unit} ({:.1}x, {} risk)",
            point.name,
            measurement.value,
            measurement.limit,
            measurement.exceedance().unwrap_or_default(),
            level.label().to_lowercase(),
        ));
    }
    if technical.is_empty() {
        technical.push("No laboratory parameters recorded for the points in view.".to_string());
    }

    let scored = RiskLevel::from_score(request.risk_score);
    let overall = worst_measured.map_or(scored, |measured| measured.max(scored));
    let mut evaluation = vec![format!(
        "Thermometer score: {}/100 ({} / {})",
        request.risk_score,
        scored.label(),
        scored.local_label()
    )];
    if let Some(measured) = worst_measured {
        evaluation.push(format!(
            "Worst measured exceedance: {} risk",
            measured.label().to_lowercase()
        ));
    }
    evaluation.push(format!(
        "Exposed receptors: {} schools, {} health facilities, {} population centres",
        counts[&Category::Education],
        counts[&Category::Health],
        counts[&Category::Population]
    ));

    let outlook = match overall {
        RiskLevel::Low => {
            "Observed values stay within reference limits; routine surveillance is sufficient."
        }
        RiskLevel::Medium => {
            "Some parameters approach or exceed reference limits; targeted follow-up is advised."
        }
        RiskLevel::High | RiskLevel::Critical => {
            "Contamination exceeds reference limits and warrants immediate intervention by the \
             competent authorities."
        }
    };
    let conclusions = vec![
        format!(
            "Overall risk is classified as {} ({}).",
            overall.label(),
            overall.local_label()
        ),
        outlook.to_string(),
    ];

    Ok(Report {
        title: "Water quality assessment report".to_string(),
        report_id: request.report_id.clone(),
        risk: overall,
        sample_count: request.points.len(),
        generated_at: Utc::now(),
        sections: vec![
            ReportSection {
                heading: "1. General information".to_string(),
                lines: general,
            },
            ReportSection {
                heading: "2. Technical interpretation".to_string(),
                lines: technical,
            },
            ReportSection {
                heading: "3. Risk evaluation".to_string(),
                lines: evaluation,
            },
            ReportSection {
                heading: "4. Conclusions".to_string(),
                lines: conclusions,
            },
            ReportSection {
                heading: "5. Recommendations".to_string(),
                lines: recommendations(overall),
            },
        ],
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Idle,
    Pending,
    Resolved(Report),
    Failed(String),
}

impl ReportStatus {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Pending => "Pending",
            Self::Resolved(_) => "Resolved",
            Self::Failed(_) => "Failed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum ReportEvent {
    Request,
    Resolve(Report),
    Fail(String),
    Reset,
}

impl ReportEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Resolve(_) => "Resolve",
            Self::Fail(_) => "Fail",
            Self::Reset => "Reset",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid report transition from {from} with event {event}")]
pub struct TransitionError {
    pub from: &'static str,
    pub event: &'static str,
}

struct NextStatus(ReportStatus);

impl TryFrom<(&ReportStatus, ReportEvent)> for NextStatus {
    type Error = TransitionError;

    fn try_from(value: (&ReportStatus, ReportEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;
        match (current, event) {
            (
                ReportStatus::Idle | ReportStatus::Resolved(_) | ReportStatus::Failed(_),
                ReportEvent::Request,
            ) => Ok(Self(ReportStatus::Pending)),
            (ReportStatus::Pending, ReportEvent::Resolve(report)) => {
                Ok(Self(ReportStatus::Resolved(report)))
            }
            (ReportStatus::Pending, ReportEvent::Fail(message)) => {
                Ok(Self(ReportStatus::Failed(message)))
            }
            (_, ReportEvent::Reset) => Ok(Self(ReportStatus::Idle)),
            (from, event) => Err(TransitionError {
                from: from.name(),
                event: event.name(),
            }),
        }
    }
}

type Outcome = Result<Report, ReportError>;

/// Idle -> Pending -> Resolved | Failed, with the generator on a tokio task.
#[derive(Debug)]
pub struct ReportTask {
    status: ReportStatus,
    receiver: Option<oneshot::Receiver<Outcome>>,
    handle: Option<JoinHandle<()>>,
}

impl Default for ReportTask {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTask {
    pub const fn new() -> Self {
        Self {
            status: ReportStatus::Idle,
            receiver: None,
            handle: None,
        }
    }

    pub const fn status(&self) -> &ReportStatus {
        &self.status
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self.status, ReportStatus::Pending)
    }

    fn transition(&mut self, event: ReportEvent) -> Result<(), TransitionError> {
        let NextStatus(next) = NextStatus::try_from((&self.status, event))?;
        tracing::debug!(from = self.status.name(), to = next.name(), "report status changed");
        self.status = next;
        Ok(())
    }

    /// Spawns the generator. Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        generator: Arc<dyn ReportGenerator>,
        request: ReportRequest,
    ) -> Result<(), TransitionError> {
        self.transition(ReportEvent::Request)?;

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let outcome = generator.generate(request).await;
            // The receiver is gone if the task was reset meanwhile.
            let _ = tx.send(outcome);
        });
        self.receiver = Some(rx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Non-blocking check for a finished generator. Returns `true` when the
    /// status changed.
    pub fn poll(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_mut() else {
            return false;
        };
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(ReportError::Aborted),
        };
        self.finish(outcome);
        true
    }

    /// Waits for the pending generator, if any.
    pub async fn wait(&mut self) -> &ReportStatus {
        if let Some(receiver) = self.receiver.take() {
            let outcome = receiver.await.unwrap_or(Err(ReportError::Aborted));
            self.finish(outcome);
        }
        &self.status
    }

    fn finish(&mut self, outcome: Outcome) {
        self.receiver = None;
        self.handle = None;
        let event = match outcome {
            Ok(report) => {
                tracing::info!(risk = report.risk.label(), "report ready");
                ReportEvent::Resolve(report)
            }
            Err(e) => {
                tracing::warn!("report failed: {e}");
                ReportEvent::Fail(e.to_string())
            }
        };
        if let Err(e) = self.transition(event) {
            tracing::warn!("{e}");
        }
    }

    /// Drops any in-flight generation and returns to idle.
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.receiver = None;
        if let Err(e) = self.transition(ReportEvent::Reset) {
            tracing::warn!("{e}");
        }
    }
}
