//! Pure data→view mapping for each dashboard region.
//!
//! Every region renders from a fresh `Result` (the loaded payload or the
//! error from its fetch) into a serializable view model. Nothing here talks
//! to the network or holds state, so regions render headlessly in tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::api::ApiError;
use crate::types::{AgendaItem, Metrics, Opportunity, Priority, ScrapedJob, Status};

/// Placeholder for a metric tile with no data.
const METRIC_PLACEHOLDER: &str = "—";

// ============================================================================
// Region state
// ============================================================================

/// Render state of one dashboard region.
///
/// A failed fetch renders as a visible `Failed` state in its own region;
/// it never escapes as an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Region<T> {
    Loaded { data: T },
    Empty { message: String },
    Failed { message: String },
}

impl<T> Region<T> {
    pub fn loaded(data: T) -> Self {
        Region::Loaded { data }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Region::Empty {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Region::Failed {
            message: message.into(),
        }
    }

    /// The loaded payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Region::Loaded { data } => Some(data),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Region::Failed { .. })
    }
}

fn list_region<T, U>(
    res: Result<&[T], &ApiError>,
    empty_message: &str,
    error_message: &str,
    map: impl Fn(&T) -> U,
) -> Region<Vec<U>> {
    match res {
        Ok(items) if items.is_empty() => Region::empty(empty_message),
        Ok(items) => Region::loaded(items.iter().map(map).collect()),
        Err(e) => {
            log::warn!("{error_message}: {e}");
            Region::failed(error_message)
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// The four metric tiles, pre-formatted. Failures render as dashes.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsView {
    pub active: String,
    pub interviews: String,
    pub remote: String,
    pub high_priority: String,
}

impl Default for MetricsView {
    fn default() -> Self {
        Self {
            active: METRIC_PLACEHOLDER.to_string(),
            interviews: METRIC_PLACEHOLDER.to_string(),
            remote: METRIC_PLACEHOLDER.to_string(),
            high_priority: METRIC_PLACEHOLDER.to_string(),
        }
    }
}

pub fn render_metrics(res: Result<&Metrics, &ApiError>) -> MetricsView {
    match res {
        Ok(m) => MetricsView {
            active: m.active_count.to_string(),
            interviews: m.interview_count.to_string(),
            remote: m.remote_count.to_string(),
            high_priority: m.priority_count.to_string(),
        },
        Err(e) => {
            log::warn!("Error loading metrics: {e}");
            MetricsView::default()
        }
    }
}

// ============================================================================
// Agenda
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AgendaRow {
    pub time: String,
    pub company: String,
    pub role: String,
    pub kind: String,
    pub meet_link: Option<String>,
}

pub fn render_agenda(res: Result<&[AgendaItem], &ApiError>) -> Region<Vec<AgendaRow>> {
    list_region(
        res,
        "No interviews scheduled",
        "Error loading agenda",
        |item| AgendaRow {
            time: item.time.clone(),
            company: item.company.clone(),
            role: item.role.clone(),
            kind: item.kind.clone(),
            meet_link: item.meet_link.clone(),
        },
    )
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRow {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: Status,
    pub is_remote: bool,
    pub priority: Priority,
    pub tech_stack: String,
    /// Relative form of `updated_at` ("Today", "3 days ago", ...).
    pub updated: String,
}

fn pipeline_row(opp: &Opportunity, now: DateTime<Utc>) -> PipelineRow {
    PipelineRow {
        id: opp.id,
        company: opp.company.clone(),
        role: opp.role.clone(),
        status: opp.status,
        is_remote: opp.is_remote,
        priority: opp.priority,
        tech_stack: if opp.tech_stack.is_empty() {
            "N/A".to_string()
        } else {
            opp.tech_stack.clone()
        },
        updated: relative_date(opp.updated_at.as_deref(), now),
    }
}

pub fn render_pipeline(
    res: Result<&[Opportunity], &ApiError>,
    now: DateTime<Utc>,
) -> Region<Vec<PipelineRow>> {
    list_region(
        res,
        "No active opportunities",
        "Error loading pipeline",
        |opp| pipeline_row(opp, now),
    )
}

pub fn render_archived_pipeline(
    res: Result<&[Opportunity], &ApiError>,
    now: DateTime<Utc>,
) -> Region<Vec<PipelineRow>> {
    list_region(
        res,
        "No archived opportunities",
        "Error loading archived pipeline",
        |opp| pipeline_row(opp, now),
    )
}

// ============================================================================
// Sacred work
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StoneRow {
    pub stone_number: i64,
    pub stone_title: String,
    pub time_spent_minutes: i64,
    pub what_built: String,
    pub insights: Option<String>,
    pub next_stone: Option<String>,
    pub status: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SacredStatsView {
    pub total_stones: i64,
    pub total_hours: f64,
    pub avg_minutes_per_stone: i64,
    pub latest_stone_date: Option<String>,
}

pub fn render_sacred_stats(
    res: Result<&crate::types::SacredWorkStats, &ApiError>,
) -> Region<SacredStatsView> {
    match res {
        Ok(stats) if stats.total_stones == 0 => Region::empty("No stones placed yet"),
        Ok(stats) => Region::loaded(SacredStatsView {
            total_stones: stats.total_stones,
            total_hours: stats.total_hours,
            avg_minutes_per_stone: stats.avg_minutes_per_stone.round() as i64,
            latest_stone_date: stats.latest_stone_date.clone(),
        }),
        Err(e) => {
            log::warn!("Error loading sacred work stats: {e}");
            Region::failed("Error loading sacred work stats")
        }
    }
}

pub fn render_sacred_progress(
    res: Result<&[crate::types::SacredStone], &ApiError>,
) -> Region<Vec<StoneRow>> {
    list_region(
        res,
        "No stones placed yet",
        "Error loading sacred work progress",
        |stone| StoneRow {
            stone_number: stone.stone_number,
            stone_title: stone.stone_title.clone(),
            time_spent_minutes: stone.time_spent_minutes,
            what_built: stone.what_built.clone(),
            insights: stone.insights.clone(),
            next_stone: stone.next_stone.clone(),
            status: stone.status.clone().unwrap_or_else(|| "Complete".to_string()),
            date: stone.date.clone().unwrap_or_else(|| "N/A".to_string()),
        },
    )
}

// ============================================================================
// Scraped jobs
// ============================================================================

/// Display tier for a match score. Presentation only: recomputed on every
/// render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreTier {
    Excellent,
    HighFit,
    Medium,
    LowFit,
    NoFit,
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 85.0 {
            ScoreTier::Excellent
        } else if score >= 75.0 {
            ScoreTier::HighFit
        } else if score >= 65.0 {
            ScoreTier::Medium
        } else if score >= 40.0 {
            ScoreTier::LowFit
        } else {
            ScoreTier::NoFit
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::HighFit => "High fit",
            ScoreTier::Medium => "Medium",
            ScoreTier::LowFit => "Low fit",
            ScoreTier::NoFit => "No fit",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub id: i64,
    pub company: String,
    pub job_title: String,
    pub location: String,
    pub salary_range: Option<String>,
    pub source: String,
    pub job_url: String,
    pub match_score: f64,
    pub tier: ScoreTier,
    pub skills: Vec<String>,
    /// "None matched" when the skills list is empty or malformed.
    pub skills_label: String,
    pub red_flags: Vec<String>,
    pub imported: bool,
}

fn job_row(job: &ScrapedJob) -> JobRow {
    let skills = job.skills();
    let skills_label = if skills.is_empty() {
        "None matched".to_string()
    } else {
        skills.join(", ")
    };

    JobRow {
        id: job.id,
        company: job.company.clone(),
        job_title: job.job_title.clone(),
        location: job.location.clone(),
        salary_range: job.salary_range.clone(),
        source: job.source.clone(),
        job_url: job.job_url.clone(),
        match_score: job.match_score,
        tier: ScoreTier::for_score(job.match_score),
        skills,
        skills_label,
        red_flags: job.flags(),
        imported: job.imported_to_opportunities,
    }
}

pub fn render_scraped_jobs(res: Result<&[ScrapedJob], &ApiError>) -> Region<Vec<JobRow>> {
    list_region(
        res,
        "No job matches at this score",
        "Error loading job matches",
        job_row,
    )
}

pub fn render_job_stats(
    res: Result<&crate::types::ScrapedJobStats, &ApiError>,
) -> Region<crate::types::ScrapedJobStats> {
    match res {
        Ok(stats) => Region::loaded(stats.clone()),
        Err(e) => {
            log::warn!("Error loading job match stats: {e}");
            Region::failed("Error loading job match stats")
        }
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Relative form of a server timestamp: "Today", "Yesterday", "N days ago",
/// then dd/mm/yyyy. Missing or unparseable values render as "N/A".
pub fn relative_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = raw else {
        return "N/A".to_string();
    };
    let Some(date) = parse_server_date(raw) else {
        return "N/A".to_string();
    };

    let days = (now.date_naive() - date).num_days();
    match days {
        i64::MIN..=0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => date.format("%d/%m/%Y").to_string(),
    }
}

fn parse_server_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// ============================================================================
// Tests
// ============================================================================
