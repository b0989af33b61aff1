//! Wire types for the job-tracker API.
//!
//! The tracker serves snake_case JSON straight out of SQLite, so booleans
//! arrive as 0/1 integers and optional columns arrive as null. Deserialization
//! is tolerant (`#[serde(default)]` everywhere the server may omit or null a
//! field) so one sloppy column never fails a whole fetch.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// serde adapters
// ============================================================================

/// Accept SQLite's 0/1 integers as well as native JSON booleans.
pub(crate) fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// Treat an explicit JSON null like a missing field.
///
/// The sacred-work stats view returns a NULL row when the log is empty;
/// `#[serde(default)]` alone only covers absent keys.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a JSON-encoded list of strings, leniently.
///
/// The scraper stores matched skills and red flags as JSON text. Depending on
/// scraper version the elements are plain strings or objects like
/// `{"skill": "Python", "weight": 10}`. Anything unparseable degrades to an
/// empty list so a bad row never breaks the render.
pub fn parse_string_list(raw: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => map
                .get("skill")
                .or_else(|| map.get("flag"))
                .or_else(|| map.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// Opportunities
// ============================================================================

/// Pipeline status of an opportunity.
///
/// Terminal statuses are what the server filters out of the active pipeline;
/// the archive action sets `Declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Lead,
    Applied,
    Screening,
    Technical,
    Manager,
    Offer,
    Rejected,
    Declined,
    Ghosted,
    Accepted,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::Rejected | Status::Declined | Status::Ghosted | Status::Accepted
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Lead => "Lead",
            Status::Applied => "Applied",
            Status::Screening => "Screening",
            Status::Technical => "Technical",
            Status::Manager => "Manager",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Declined => "Declined",
            Status::Ghosted => "Ghosted",
            Status::Accepted => "Accepted",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        })
    }
}

/// A tracked job application or lead, as the server returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: Status,
    #[serde(default, deserialize_with = "bool_from_int")]
    pub is_remote: bool,
    pub priority: Priority,
    #[serde(default)]
    pub tech_stack: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub recruiter_name: Option<String>,
    #[serde(default)]
    pub recruiter_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discovered_date: Option<String>,
    #[serde(default)]
    pub last_interaction_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload for `POST /api/add-opportunity`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOpportunity {
    pub company: String,
    pub role: String,
    pub source: String,
    pub is_remote: bool,
    pub tech_stack: String,
    pub recruiter_phone: String,
    pub notes: String,
    pub status: Status,
    pub priority: Priority,
}

/// Partial update payload for `PATCH /api/update-opportunity/:id`.
///
/// Only the fields that are set are serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpportunityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OpportunityPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn remote(is_remote: bool) -> Self {
        Self {
            is_remote: Some(is_remote),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }
}

// ============================================================================
// Dashboard reads
// ============================================================================

/// Aggregate counts for the metric tiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub active_count: i64,
    #[serde(default)]
    pub interview_count: i64,
    #[serde(default)]
    pub remote_count: i64,
    #[serde(default)]
    pub priority_count: i64,
}

/// One scheduled interview from the agenda query.
///
/// The server joins interactions with opportunities; only the display fields
/// are required, the rest ride along with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub date: Option<String>,
    pub company: String,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub meet_link: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub participants: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A known opportunity source (job board, referral, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_name: String,
}

// ============================================================================
// Sacred work
// ============================================================================

/// One logged unit of completed work. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SacredStone {
    pub stone_number: i64,
    pub stone_title: String,
    #[serde(default)]
    pub time_spent_minutes: i64,
    #[serde(default)]
    pub what_built: String,
    #[serde(default)]
    pub insights: Option<String>,
    #[serde(default)]
    pub next_stone: Option<String>,
    #[serde(default)]
    pub felt_sense: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Aggregates from the sacred-work stats view.
///
/// An empty log yields a NULL row server-side, hence `null_to_default` on
/// every numeric field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SacredWorkStats {
    #[serde(default, deserialize_with = "null_to_default")]
    pub total_stones: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub total_minutes: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub avg_minutes_per_stone: f64,
    #[serde(default)]
    pub first_stone_date: Option<String>,
    #[serde(default)]
    pub latest_stone_date: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub total_hours: f64,
}

/// Payload for `POST /api/add-sacred-work`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStone {
    pub stone_number: i64,
    pub stone_title: String,
    pub time_spent_minutes: i64,
    pub what_built: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub felt_sense: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

// ============================================================================
// Scraped jobs
// ============================================================================

/// A pre-scored job listing from the scraper. Read-only here apart from the
/// one-way import into opportunities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedJob {
    pub id: i64,
    pub company: String,
    pub job_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub job_url: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub match_score: f64,
    /// JSON-encoded list; parse with [`ScrapedJob::skills`].
    #[serde(default)]
    pub matched_skills: String,
    /// JSON-encoded list; parse with [`ScrapedJob::flags`].
    #[serde(default)]
    pub red_flags: String,
    #[serde(default, deserialize_with = "bool_from_int")]
    pub imported_to_opportunities: bool,
}

impl ScrapedJob {
    pub fn skills(&self) -> Vec<String> {
        parse_string_list(&self.matched_skills)
    }

    pub fn flags(&self) -> Vec<String> {
        parse_string_list(&self.red_flags)
    }
}

/// Summary counts from the scraper, bucketed by the same score tiers the
/// dashboard displays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedJobStats {
    #[serde(default, deserialize_with = "null_to_default")]
    pub total_jobs: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub excellent: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub high_fit: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub medium_fit: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub low_fit: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub no_fit: i64,
}

// ============================================================================
// Tests
// ============================================================================
