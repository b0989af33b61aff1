//! Dashboard controller: state synchronization between the view regions and
//! the tracker API.
//!
//! The controller never applies a mutation to its local view. Every
//! state-changing action issues exactly one HTTP mutation, then re-fetches
//! the resources that mutation can move: success re-syncs the dependent
//! regions to authoritative server state, failure re-fetches the primary
//! region so any control snaps back to the last known-good value. There is
//! no undo stack; re-fetching is the rollback.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{ApiClient, ApiError};
use crate::render::{
    self, JobRow, MetricsView, PipelineRow, Region, SacredStatsView, StoneRow,
};
use crate::tabs::{Activation, Tab, TabRouter};
use crate::toast::ToastQueue;
use crate::types::{
    AgendaItem, Metrics, NewOpportunity, NewStone, Opportunity, OpportunityPatch, Priority,
    SacredStone, SacredWorkStats, ScrapedJob, ScrapedJobStats, SourceRecord, Status,
};

/// Fixed message for intercepted delete attempts. No destructive endpoint is
/// exposed, so this never reaches the network.
pub const DELETE_UNSUPPORTED: &str =
    "Deleting is not supported. Archive the opportunity instead.";

/// Row cap passed to the scraped-jobs query.
const JOBS_LIMIT: u32 = 50;

// ============================================================================
// API seam
// ============================================================================

/// Boundary between the controller and the HTTP client.
///
/// Dyn-compatible async trait so tests can swap in a recording stub and
/// verify call ordering and absence.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn fetch_metrics(&self) -> Result<Metrics, ApiError>;
    async fn fetch_agenda(&self) -> Result<Vec<AgendaItem>, ApiError>;
    async fn fetch_pipeline(&self) -> Result<Vec<Opportunity>, ApiError>;
    async fn fetch_archived_pipeline(&self) -> Result<Vec<Opportunity>, ApiError>;
    async fn fetch_sources(&self) -> Result<Vec<SourceRecord>, ApiError>;
    async fn create_source(&self, source_name: &str) -> Result<SourceRecord, ApiError>;
    async fn create_opportunity(&self, new: &NewOpportunity) -> Result<i64, ApiError>;
    async fn patch_opportunity(
        &self,
        id: i64,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, ApiError>;
    async fn fetch_sacred_work_stats(&self) -> Result<SacredWorkStats, ApiError>;
    async fn fetch_sacred_work_progress(&self) -> Result<Vec<SacredStone>, ApiError>;
    async fn create_stone(&self, stone: &NewStone) -> Result<i64, ApiError>;
    async fn fetch_scraped_jobs(
        &self,
        min_score: u32,
        limit: u32,
    ) -> Result<Vec<ScrapedJob>, ApiError>;
    async fn fetch_scraped_job_stats(&self) -> Result<ScrapedJobStats, ApiError>;
}

#[async_trait]
impl TrackerApi for ApiClient {
    async fn fetch_metrics(&self) -> Result<Metrics, ApiError> {
        ApiClient::fetch_metrics(self).await
    }
    async fn fetch_agenda(&self) -> Result<Vec<AgendaItem>, ApiError> {
        ApiClient::fetch_agenda(self).await
    }
    async fn fetch_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
        ApiClient::fetch_pipeline(self).await
    }
    async fn fetch_archived_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
        ApiClient::fetch_archived_pipeline(self).await
    }
    async fn fetch_sources(&self) -> Result<Vec<SourceRecord>, ApiError> {
        ApiClient::fetch_sources(self).await
    }
    async fn create_source(&self, source_name: &str) -> Result<SourceRecord, ApiError> {
        ApiClient::create_source(self, source_name).await
    }
    async fn create_opportunity(&self, new: &NewOpportunity) -> Result<i64, ApiError> {
        ApiClient::create_opportunity(self, new).await
    }
    async fn patch_opportunity(
        &self,
        id: i64,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, ApiError> {
        ApiClient::patch_opportunity(self, id, patch).await
    }
    async fn fetch_sacred_work_stats(&self) -> Result<SacredWorkStats, ApiError> {
        ApiClient::fetch_sacred_work_stats(self).await
    }
    async fn fetch_sacred_work_progress(&self) -> Result<Vec<SacredStone>, ApiError> {
        ApiClient::fetch_sacred_work_progress(self).await
    }
    async fn create_stone(&self, stone: &NewStone) -> Result<i64, ApiError> {
        ApiClient::create_stone(self, stone).await
    }
    async fn fetch_scraped_jobs(
        &self,
        min_score: u32,
        limit: u32,
    ) -> Result<Vec<ScrapedJob>, ApiError> {
        ApiClient::fetch_scraped_jobs(self, min_score, limit).await
    }
    async fn fetch_scraped_job_stats(&self) -> Result<ScrapedJobStats, ApiError> {
        ApiClient::fetch_scraped_job_stats(self).await
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// A server-side resource the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Metrics,
    Agenda,
    Pipeline,
    ArchivedPipeline,
    Sources,
    SacredWork,
    ScrapedJobs,
}

/// Every state-changing user action, each mapped to exactly one HTTP
/// mutation. The resync/revert sets make the dependency between a mutation
/// and its affected views a first-class mapping.
#[derive(Debug, Clone)]
pub enum Mutation {
    SetStatus { id: i64, status: Status },
    SetRemote { id: i64, is_remote: bool },
    SetNotes { id: i64, notes: String },
    Archive { id: i64 },
    AddOpportunity(NewOpportunity),
    AddSource { source_name: String },
    LogStone(NewStone),
    ImportJob(NewOpportunity),
}

impl Mutation {
    /// Resources to re-fetch after the server confirms this mutation.
    ///
    /// A status change touches three views: the row can move between
    /// pipeline and archive, and the aggregate counts shift.
    pub fn resync_targets(&self) -> &'static [Resource] {
        match self {
            Mutation::SetStatus { .. } | Mutation::Archive { .. } => &[
                Resource::Pipeline,
                Resource::ArchivedPipeline,
                Resource::Metrics,
            ],
            Mutation::SetRemote { .. } => &[Resource::Pipeline, Resource::Metrics],
            Mutation::SetNotes { .. } => &[Resource::Pipeline],
            Mutation::AddOpportunity(_) => &[Resource::Pipeline, Resource::Metrics],
            Mutation::AddSource { .. } => &[Resource::Sources],
            Mutation::LogStone(_) => &[Resource::SacredWork],
            Mutation::ImportJob(_) => &[
                Resource::ScrapedJobs,
                Resource::Pipeline,
                Resource::Metrics,
            ],
        }
    }

    /// Resources to re-fetch after a failed mutation, forcing the control
    /// that issued it back to the last known-good server state.
    pub fn revert_targets(&self) -> &'static [Resource] {
        match self {
            Mutation::SetStatus { .. }
            | Mutation::SetRemote { .. }
            | Mutation::SetNotes { .. }
            | Mutation::Archive { .. } => &[Resource::Pipeline],
            Mutation::AddSource { .. } => &[Resource::Sources],
            // Creates leave no stale control behind on failure
            Mutation::AddOpportunity(_) | Mutation::LogStone(_) | Mutation::ImportJob(_) => &[],
        }
    }

    fn success_message(&self) -> String {
        match self {
            Mutation::SetStatus { status, .. } => format!("Status changed to {status}"),
            Mutation::SetRemote { .. } => "Remote flag updated".to_string(),
            Mutation::SetNotes { .. } => "Notes saved".to_string(),
            Mutation::Archive { .. } => "Opportunity archived".to_string(),
            Mutation::AddOpportunity(new) => format!("Added {} ({})", new.company, new.role),
            Mutation::AddSource { source_name } => format!("Source \"{source_name}\" added"),
            Mutation::LogStone(stone) => format!("Stone {} placed", stone.stone_number),
            Mutation::ImportJob(new) => format!("Imported {} ({})", new.company, new.role),
        }
    }

    /// Build the one-way import of a scraped job into the pipeline, using the
    /// add form's defaults: status Lead, priority High for remote roles.
    pub fn import_job(job: &ScrapedJob) -> Mutation {
        let is_remote = {
            let loc = job.location.to_lowercase();
            loc.is_empty() || loc.contains("remote") || loc.contains("worldwide")
        };
        let skills = job.skills();
        Mutation::ImportJob(NewOpportunity {
            company: job.company.clone(),
            role: job.job_title.clone(),
            source: if job.source.is_empty() {
                "Scraper".to_string()
            } else {
                job.source.clone()
            },
            is_remote,
            tech_stack: skills.join(", "),
            recruiter_phone: String::new(),
            notes: format!("Imported from scraper: {}", job.job_url),
            status: Status::Lead,
            priority: if is_remote {
                Priority::High
            } else {
                Priority::Medium
            },
        })
    }
}

/// Why a user action did not go through.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Rejected client-side before any request was issued.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

// ============================================================================
// Form types
// ============================================================================

/// Source selection on the add-opportunity form: an existing cached source,
/// or the "add new" free-text mode.
#[derive(Debug, Clone)]
pub enum SourceChoice {
    Existing(String),
    New(String),
}

/// The add-opportunity form as submitted by the user.
#[derive(Debug, Clone)]
pub struct OpportunityForm {
    pub company: String,
    pub role: String,
    pub source: SourceChoice,
    pub is_remote: bool,
    pub tech_stack: String,
    pub recruiter_phone: String,
    pub notes: String,
}

impl OpportunityForm {
    fn payload(self, source_name: String) -> NewOpportunity {
        let priority = if self.is_remote {
            Priority::High
        } else {
            Priority::Medium
        };
        NewOpportunity {
            company: self.company,
            role: self.role,
            source: source_name,
            is_remote: self.is_remote,
            tech_stack: self.tech_stack,
            recruiter_phone: self.recruiter_phone,
            notes: self.notes,
            status: Status::Lead,
            priority,
        }
    }
}

// ============================================================================
// Regions
// ============================================================================

/// The rendered view state, one field per dashboard region.
#[derive(Debug)]
pub struct Regions {
    pub metrics: MetricsView,
    pub agenda: Region<Vec<render::AgendaRow>>,
    pub pipeline: Region<Vec<PipelineRow>>,
    pub archived: Region<Vec<PipelineRow>>,
    pub sacred_stats: Region<SacredStatsView>,
    pub sacred_progress: Region<Vec<StoneRow>>,
    pub jobs: Region<Vec<JobRow>>,
    pub job_stats: Region<ScrapedJobStats>,
}

impl Default for Regions {
    fn default() -> Self {
        Self {
            metrics: MetricsView::default(),
            agenda: Region::empty("Not loaded"),
            pipeline: Region::empty("Not loaded"),
            archived: Region::empty("Not loaded"),
            sacred_stats: Region::empty("Not loaded"),
            sacred_progress: Region::empty("Not loaded"),
            jobs: Region::empty("Not loaded"),
            job_stats: Region::empty("Not loaded"),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// The dashboard context object. Owns the API handle, the source cache, the
/// score filter, tab state, the toast queue, and the current region views.
///
/// All methods take `&mut self`, so a fetch+render is atomic per resource:
/// a region is only ever assigned from a completed response.
pub struct Dashboard {
    api: Arc<dyn TrackerApi>,
    pub regions: Regions,
    pub toasts: ToastQueue,
    tabs: TabRouter,
    sources: Vec<SourceRecord>,
    min_score: u32,
}

impl Dashboard {
    pub fn new(api: Arc<dyn TrackerApi>, min_score: u32) -> Self {
        Self {
            api,
            regions: Regions::default(),
            toasts: ToastQueue::new(),
            tabs: TabRouter::new(),
            sources: Vec::new(),
            min_score,
        }
    }

    /// Cached source list for populating the form's selection control.
    pub fn sources(&self) -> &[SourceRecord] {
        &self.sources
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.active()
    }

    /// Full dashboard load: fan out the overview resources concurrently and
    /// render each independently. A failure in one region never blocks the
    /// others; partial degradation is the contract.
    ///
    /// Also runs on the periodic tick and on manual refresh.
    pub async fn load_dashboard(&mut self) {
        let api = Arc::clone(&self.api);
        let (metrics, agenda, pipeline, archived, sources) = tokio::join!(
            api.fetch_metrics(),
            api.fetch_agenda(),
            api.fetch_pipeline(),
            api.fetch_archived_pipeline(),
            api.fetch_sources(),
        );

        let now = Utc::now();
        self.regions.metrics = render::render_metrics(metrics.as_ref());
        self.regions.agenda = render::render_agenda(agenda.as_ref().map(|v| v.as_slice()));
        self.regions.pipeline =
            render::render_pipeline(pipeline.as_ref().map(|v| v.as_slice()), now);
        self.regions.archived =
            render::render_archived_pipeline(archived.as_ref().map(|v| v.as_slice()), now);

        match sources {
            Ok(list) => self.sources = list,
            // Keep the stale cache; the form can still submit
            Err(e) => log::warn!("Error loading sources: {e}"),
        }

        log::info!("Dashboard loaded");
    }

    /// Re-fetch and re-render a set of resources, one at a time.
    async fn resync(&mut self, targets: &[Resource]) {
        for target in targets {
            match target {
                Resource::Metrics => {
                    let res = self.api.fetch_metrics().await;
                    self.regions.metrics = render::render_metrics(res.as_ref());
                }
                Resource::Agenda => {
                    let res = self.api.fetch_agenda().await;
                    self.regions.agenda =
                        render::render_agenda(res.as_ref().map(|v| v.as_slice()));
                }
                Resource::Pipeline => {
                    let res = self.api.fetch_pipeline().await;
                    self.regions.pipeline = render::render_pipeline(
                        res.as_ref().map(|v| v.as_slice()),
                        Utc::now(),
                    );
                }
                Resource::ArchivedPipeline => {
                    let res = self.api.fetch_archived_pipeline().await;
                    self.regions.archived = render::render_archived_pipeline(
                        res.as_ref().map(|v| v.as_slice()),
                        Utc::now(),
                    );
                }
                Resource::Sources => {
                    match self.api.fetch_sources().await {
                        Ok(list) => self.sources = list,
                        Err(e) => log::warn!("Error loading sources: {e}"),
                    }
                }
                Resource::SacredWork => {
                    let stats = self.api.fetch_sacred_work_stats().await;
                    self.regions.sacred_stats = render::render_sacred_stats(stats.as_ref());
                    let progress = self.api.fetch_sacred_work_progress().await;
                    self.regions.sacred_progress =
                        render::render_sacred_progress(progress.as_ref().map(|v| v.as_slice()));
                }
                Resource::ScrapedJobs => {
                    let jobs = self.api.fetch_scraped_jobs(self.min_score, JOBS_LIMIT).await;
                    self.regions.jobs =
                        render::render_scraped_jobs(jobs.as_ref().map(|v| v.as_slice()));
                    let stats = self.api.fetch_scraped_job_stats().await;
                    self.regions.job_stats = render::render_job_stats(stats.as_ref());
                }
            }
        }
    }

    /// Apply one mutation through the sync protocol: send, toast, resync.
    pub async fn apply(&mut self, mutation: Mutation) -> Result<(), ApiError> {
        log::debug!("applying mutation: {mutation:?}");
        match self.dispatch(&mutation).await {
            Ok(()) => {
                self.toasts.success(mutation.success_message());
                self.resync(mutation.resync_targets()).await;
                Ok(())
            }
            Err(e) => {
                log::warn!("mutation failed: {e}");
                self.toasts.error(e.user_message());
                self.resync(mutation.revert_targets()).await;
                Err(e)
            }
        }
    }

    /// The single HTTP request behind each mutation.
    async fn dispatch(&self, mutation: &Mutation) -> Result<(), ApiError> {
        match mutation {
            Mutation::SetStatus { id, status } => {
                self.api
                    .patch_opportunity(*id, &OpportunityPatch::status(*status))
                    .await?;
            }
            Mutation::SetRemote { id, is_remote } => {
                self.api
                    .patch_opportunity(*id, &OpportunityPatch::remote(*is_remote))
                    .await?;
            }
            Mutation::SetNotes { id, notes } => {
                self.api
                    .patch_opportunity(*id, &OpportunityPatch::notes(notes.clone()))
                    .await?;
            }
            Mutation::Archive { id } => {
                self.api
                    .patch_opportunity(*id, &OpportunityPatch::status(Status::Declined))
                    .await?;
            }
            Mutation::AddOpportunity(new) | Mutation::ImportJob(new) => {
                self.api.create_opportunity(new).await?;
            }
            Mutation::AddSource { source_name } => {
                self.api.create_source(source_name).await?;
            }
            Mutation::LogStone(stone) => {
                self.api.create_stone(stone).await?;
            }
        }
        Ok(())
    }

    /// Submit the add-opportunity form.
    ///
    /// With a new source, the source must exist before the opportunity that
    /// references it: create it first, and abort the whole submission if that
    /// fails. Validation short-circuits before any network call.
    pub async fn submit_opportunity(&mut self, form: OpportunityForm) -> Result<(), ActionError> {
        if form.company.trim().is_empty() || form.role.trim().is_empty() {
            return Err(self.reject("Company and role are required"));
        }

        let source_name = match &form.source {
            SourceChoice::Existing(name) => name.clone(),
            SourceChoice::New(raw) => {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(self.reject("Enter a name for the new source"));
                }
                match self.api.create_source(name).await {
                    Ok(record) => {
                        self.resync(&[Resource::Sources]).await;
                        record.source_name
                    }
                    Err(e) => {
                        self.toasts
                            .error(format!("Could not create source: {}", e.user_message()));
                        return Err(ActionError::Api(e));
                    }
                }
            }
        };

        let payload = form.payload(source_name);
        self.apply(Mutation::AddOpportunity(payload))
            .await
            .map_err(ActionError::Api)
    }

    /// Log a sacred-work stone, mirroring the server's required fields
    /// client-side so an incomplete entry never leaves the form.
    pub async fn submit_stone(&mut self, stone: NewStone) -> Result<(), ActionError> {
        let mut missing = Vec::new();
        if stone.stone_number < 1 {
            missing.push("stone_number");
        }
        if stone.stone_title.trim().is_empty() {
            missing.push("stone_title");
        }
        if stone.time_spent_minutes < 1 {
            missing.push("time_spent_minutes");
        }
        if stone.what_built.trim().is_empty() {
            missing.push("what_built");
        }
        if !missing.is_empty() {
            return Err(self.reject(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        self.apply(Mutation::LogStone(stone))
            .await
            .map_err(ActionError::Api)
    }

    /// Delete is unsupported: short-circuit to a fixed message, no request.
    pub fn request_delete(&mut self) -> &'static str {
        self.toasts.info(DELETE_UNSUPPORTED);
        DELETE_UNSUPPORTED
    }

    /// Switch tabs, lazily loading a data-backed tab on first activation.
    pub async fn activate_tab(&mut self, tab: Tab) {
        if let Activation::Switched { needs_load: true } = self.tabs.activate(tab) {
            match tab {
                Tab::SacredWork => self.resync(&[Resource::SacredWork]).await,
                Tab::JobMatches => self.resync(&[Resource::ScrapedJobs]).await,
                Tab::Overview => {}
            }
            self.tabs.mark_loaded(tab);
        }
    }

    /// Change the score filter and re-issue the scraped-jobs read.
    pub async fn set_score_filter(&mut self, min_score: u32) {
        self.min_score = min_score;
        self.resync(&[Resource::ScrapedJobs]).await;
    }

    fn reject(&mut self, message: impl Into<String>) -> ActionError {
        let message = message.into();
        self.toasts.error(message.clone());
        ActionError::Validation(message)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::Severity;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Recording stub for the API seam. Tracks every call in order, fails on
    /// demand, and keeps a small in-memory pipeline so status changes move
    /// rows the way the server would.
    #[derive(Default)]
    struct StubApi {
        calls: Mutex<Vec<String>>,
        fail: Mutex<HashSet<&'static str>>,
        pipeline: Mutex<Vec<Opportunity>>,
        archived: Mutex<Vec<Opportunity>>,
        sources: Mutex<Vec<SourceRecord>>,
        jobs: Mutex<Vec<ScrapedJob>>,
    }

    impl StubApi {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn fail_on(&self, call: &'static str) {
            self.fail.lock().unwrap().insert(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call.to_string());
            let failing = self
                .fail
                .lock()
                .unwrap()
                .iter()
                .any(|f| call.starts_with(f));
            if failing {
                Err(ApiError::Api {
                    status: 500,
                    message: format!("{call} failed"),
                })
            } else {
                Ok(())
            }
        }

        fn seed_opportunity(&self, id: i64, company: &str, status: Status) {
            self.pipeline.lock().unwrap().push(opp(id, company, status));
        }
    }

    fn opp(id: i64, company: &str, status: Status) -> Opportunity {
        Opportunity {
            id,
            company: company.to_string(),
            role: "QA Lead".to_string(),
            status,
            is_remote: true,
            priority: Priority::High,
            tech_stack: "Python".to_string(),
            source: None,
            salary_range: None,
            recruiter_name: None,
            recruiter_phone: None,
            notes: None,
            discovered_date: None,
            last_interaction_date: None,
            updated_at: Some("2026-08-06 09:00:00".to_string()),
        }
    }

    #[async_trait]
    impl TrackerApi for StubApi {
        async fn fetch_metrics(&self) -> Result<Metrics, ApiError> {
            self.record("metrics")?;
            Ok(Metrics {
                active_count: self.pipeline.lock().unwrap().len() as i64,
                interview_count: 1,
                remote_count: 1,
                priority_count: 1,
            })
        }

        async fn fetch_agenda(&self) -> Result<Vec<AgendaItem>, ApiError> {
            self.record("agenda")?;
            Ok(vec![AgendaItem {
                id: Some(1),
                time: "10:00 AM".to_string(),
                date: None,
                company: "Company A".to_string(),
                role: "QA Lead".to_string(),
                kind: "Screening".to_string(),
                meet_link: None,
                status: None,
                participants: None,
                summary: None,
            }])
        }

        async fn fetch_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
            self.record("pipeline")?;
            Ok(self.pipeline.lock().unwrap().clone())
        }

        async fn fetch_archived_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
            self.record("archived-pipeline")?;
            Ok(self.archived.lock().unwrap().clone())
        }

        async fn fetch_sources(&self) -> Result<Vec<SourceRecord>, ApiError> {
            self.record("sources")?;
            Ok(self.sources.lock().unwrap().clone())
        }

        async fn create_source(&self, source_name: &str) -> Result<SourceRecord, ApiError> {
            self.record("add-source")?;
            let record = SourceRecord {
                source_name: source_name.to_string(),
            };
            self.sources.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn create_opportunity(&self, new: &NewOpportunity) -> Result<i64, ApiError> {
            self.record("add-opportunity")?;
            let id = {
                let mut pipeline = self.pipeline.lock().unwrap();
                let id = pipeline.iter().map(|o| o.id).max().unwrap_or(0) + 1;
                let mut row = opp(id, &new.company, new.status);
                row.role = new.role.clone();
                row.is_remote = new.is_remote;
                row.priority = new.priority;
                pipeline.push(row);
                id
            };
            Ok(id)
        }

        async fn patch_opportunity(
            &self,
            id: i64,
            patch: &OpportunityPatch,
        ) -> Result<Opportunity, ApiError> {
            self.record("update-opportunity")?;
            let mut pipeline = self.pipeline.lock().unwrap();
            let mut archived = self.archived.lock().unwrap();

            let pos_active = pipeline.iter().position(|o| o.id == id);
            let pos_archived = archived.iter().position(|o| o.id == id);
            let mut row = match (pos_active, pos_archived) {
                (Some(i), _) => pipeline.remove(i),
                (None, Some(i)) => archived.remove(i),
                (None, None) => {
                    return Err(ApiError::Api {
                        status: 404,
                        message: format!("no opportunity with id {id}"),
                    })
                }
            };

            if let Some(status) = patch.status {
                row.status = status;
            }
            if let Some(is_remote) = patch.is_remote {
                row.is_remote = is_remote;
            }
            if let Some(ref notes) = patch.notes {
                row.notes = Some(notes.clone());
            }

            let updated = row.clone();
            if row.status.is_terminal() {
                archived.push(row);
            } else {
                pipeline.push(row);
            }
            Ok(updated)
        }

        async fn fetch_sacred_work_stats(&self) -> Result<SacredWorkStats, ApiError> {
            self.record("sacred-work-stats")?;
            Ok(SacredWorkStats::default())
        }

        async fn fetch_sacred_work_progress(&self) -> Result<Vec<SacredStone>, ApiError> {
            self.record("sacred-work-progress")?;
            Ok(Vec::new())
        }

        async fn create_stone(&self, _stone: &NewStone) -> Result<i64, ApiError> {
            self.record("add-sacred-work")?;
            Ok(1)
        }

        async fn fetch_scraped_jobs(
            &self,
            min_score: u32,
            _limit: u32,
        ) -> Result<Vec<ScrapedJob>, ApiError> {
            self.record(&format!("scraped-jobs min_score={min_score}"))?;
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .iter()
                .filter(|j| j.match_score >= min_score as f64)
                .cloned()
                .collect())
        }

        async fn fetch_scraped_job_stats(&self) -> Result<ScrapedJobStats, ApiError> {
            self.record("scraped-jobs-stats")?;
            Ok(ScrapedJobStats::default())
        }
    }

    fn form(source: SourceChoice) -> OpportunityForm {
        OpportunityForm {
            company: "TechCorp".to_string(),
            role: "QA Lead".to_string(),
            source,
            is_remote: true,
            tech_stack: "AWS".to_string(),
            recruiter_phone: String::new(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_partial_degradation_on_dashboard_load() {
        let stub = StubApi::new();
        stub.seed_opportunity(1, "Company A", Status::Screening);
        stub.fail_on("metrics");

        let mut dash = Dashboard::new(stub.clone(), 60);
        dash.load_dashboard().await;

        // The failed region degrades; the other three render
        assert_eq!(dash.regions.metrics.active, "—");
        assert!(dash.regions.pipeline.data().is_some());
        assert!(!dash.regions.agenda.is_failed());
        assert!(!dash.regions.archived.is_failed());
    }

    #[tokio::test]
    async fn test_status_change_moves_row_to_archive() {
        let stub = StubApi::new();
        stub.seed_opportunity(1, "Company A", Status::Screening);

        let mut dash = Dashboard::new(stub.clone(), 60);
        dash.load_dashboard().await;
        assert_eq!(dash.regions.pipeline.data().unwrap().len(), 1);

        dash.apply(Mutation::SetStatus {
            id: 1,
            status: Status::Declined,
        })
        .await
        .unwrap();

        // Row disappeared from active and appeared in archived after resync
        assert!(dash.regions.pipeline.data().is_none());
        let archived = dash.regions.archived.data().unwrap();
        assert_eq!(archived[0].company, "Company A");
        assert_eq!(archived[0].status, Status::Declined);

        // The mutation resynced pipeline, archive, and metrics
        let calls = stub.calls();
        let tail = &calls[calls.len() - 4..];
        assert_eq!(
            tail,
            ["update-opportunity", "pipeline", "archived-pipeline", "metrics"]
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_reverts_by_refetch() {
        let stub = StubApi::new();
        stub.seed_opportunity(1, "Company A", Status::Screening);
        stub.fail_on("update-opportunity");

        let mut dash = Dashboard::new(stub.clone(), 60);
        let err = dash
            .apply(Mutation::SetStatus {
                id: 1,
                status: Status::Offer,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "update-opportunity failed");

        // Error toast + a re-fetch of the pipeline to snap the control back
        assert!(dash
            .toasts
            .iter()
            .any(|t| t.severity == Severity::Error && t.message.contains("failed")));
        assert_eq!(stub.calls(), ["update-opportunity", "pipeline"]);

        // The untouched row is still active
        assert_eq!(dash.regions.pipeline.data().unwrap()[0].status, Status::Screening);
    }

    #[tokio::test]
    async fn test_new_source_created_before_opportunity() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        dash.submit_opportunity(form(SourceChoice::New("LinkedIn".to_string())))
            .await
            .unwrap();

        let calls = stub.calls();
        let source_pos = calls.iter().position(|c| c == "add-source").unwrap();
        let opp_pos = calls.iter().position(|c| c == "add-opportunity").unwrap();
        assert!(source_pos < opp_pos, "source must exist before the opportunity");

        // Cache refreshed with the new source
        assert!(dash
            .sources()
            .iter()
            .any(|s| s.source_name == "LinkedIn"));
    }

    #[tokio::test]
    async fn test_failed_source_creation_aborts_submission() {
        let stub = StubApi::new();
        stub.fail_on("add-source");

        let mut dash = Dashboard::new(stub.clone(), 60);
        let err = dash
            .submit_opportunity(form(SourceChoice::New("LinkedIn".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Api(_)));

        let calls = stub.calls();
        assert!(calls.contains(&"add-source".to_string()));
        assert!(
            !calls.contains(&"add-opportunity".to_string()),
            "no opportunity may be created when the source fails"
        );
    }

    #[tokio::test]
    async fn test_empty_new_source_aborts_before_network() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        let err = dash
            .submit_opportunity(form(SourceChoice::New("   ".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        assert!(stub.calls().is_empty(), "validation must issue no requests");
        assert!(dash.toasts.iter().any(|t| t.severity == Severity::Error));
    }

    #[tokio::test]
    async fn test_existing_source_submits_directly() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        dash.submit_opportunity(form(SourceChoice::Existing("Referral".to_string())))
            .await
            .unwrap();

        let calls = stub.calls();
        assert!(!calls.contains(&"add-source".to_string()));
        assert_eq!(calls[0], "add-opportunity");
    }

    #[tokio::test]
    async fn test_delete_is_intercepted() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        let message = dash.request_delete();
        assert_eq!(message, DELETE_UNSUPPORTED);
        assert!(stub.calls().is_empty(), "delete must never reach the network");
        assert!(dash.toasts.iter().any(|t| t.severity == Severity::Info));
    }

    #[tokio::test]
    async fn test_tab_lazy_load_once() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        dash.activate_tab(Tab::SacredWork).await;
        let after_first = stub.calls();
        assert!(after_first.contains(&"sacred-work-stats".to_string()));
        assert!(after_first.contains(&"sacred-work-progress".to_string()));

        // Flip away and back: no refetch
        dash.activate_tab(Tab::Overview).await;
        dash.activate_tab(Tab::SacredWork).await;
        assert_eq!(stub.calls(), after_first);
    }

    #[tokio::test]
    async fn test_score_filter_reissues_query() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        dash.activate_tab(Tab::JobMatches).await;
        assert!(stub
            .calls()
            .contains(&"scraped-jobs min_score=60".to_string()));

        dash.set_score_filter(75).await;
        assert_eq!(dash.min_score(), 75);
        assert!(stub
            .calls()
            .contains(&"scraped-jobs min_score=75".to_string()));
    }

    #[tokio::test]
    async fn test_stone_validation_blocks_incomplete_entry() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        let err = dash
            .submit_stone(NewStone {
                stone_number: 3,
                stone_title: "Third brick".to_string(),
                time_spent_minutes: 45,
                what_built: "  ".to_string(),
                insights: None,
                next_stone: None,
                felt_sense: None,
                date: None,
            })
            .await
            .unwrap_err();

        match err {
            ActionError::Validation(msg) => assert!(msg.contains("what_built")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stone_logged_and_resynced() {
        let stub = StubApi::new();
        let mut dash = Dashboard::new(stub.clone(), 60);

        dash.submit_stone(NewStone {
            stone_number: 3,
            stone_title: "Third brick".to_string(),
            time_spent_minutes: 45,
            what_built: "metrics view".to_string(),
            insights: Some("smaller steps".to_string()),
            next_stone: None,
            felt_sense: None,
            date: Some("2026-08-06".to_string()),
        })
        .await
        .unwrap();

        assert_eq!(
            stub.calls(),
            ["add-sacred-work", "sacred-work-stats", "sacred-work-progress"]
        );
        assert!(dash
            .toasts
            .iter()
            .any(|t| t.severity == Severity::Success && t.message.contains("Stone 3")));
    }

    #[tokio::test]
    async fn test_notes_edit_resyncs_pipeline_only() {
        let stub = StubApi::new();
        stub.seed_opportunity(2, "Company B", Status::Technical);

        let mut dash = Dashboard::new(stub.clone(), 60);
        dash.apply(Mutation::SetNotes {
            id: 2,
            notes: "spoke with recruiter".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(stub.calls(), ["update-opportunity", "pipeline"]);
        assert!(dash
            .toasts
            .iter()
            .any(|t| t.severity == Severity::Success && t.message == "Notes saved"));
        assert_eq!(
            stub.pipeline.lock().unwrap()[0].notes.as_deref(),
            Some("spoke with recruiter")
        );
    }

    #[test]
    fn test_resync_mapping() {
        let set_status = Mutation::SetStatus {
            id: 1,
            status: Status::Offer,
        };
        assert_eq!(
            set_status.resync_targets(),
            [
                Resource::Pipeline,
                Resource::ArchivedPipeline,
                Resource::Metrics
            ]
        );
        assert_eq!(set_status.revert_targets(), [Resource::Pipeline]);

        let add_source = Mutation::AddSource {
            source_name: "LinkedIn".to_string(),
        };
        assert_eq!(add_source.resync_targets(), [Resource::Sources]);

        let remote = Mutation::SetRemote {
            id: 1,
            is_remote: false,
        };
        assert_eq!(
            remote.resync_targets(),
            [Resource::Pipeline, Resource::Metrics]
        );

        let notes = Mutation::SetNotes {
            id: 1,
            notes: String::new(),
        };
        assert_eq!(notes.resync_targets(), [Resource::Pipeline]);
    }

    #[test]
    fn test_import_job_payload_defaults() {
        let job = ScrapedJob {
            id: 7,
            company: "RemoteCo".to_string(),
            job_title: "Senior QA Engineer".to_string(),
            location: "Worldwide".to_string(),
            salary_range: None,
            source: "remoteok".to_string(),
            job_url: "https://remoteok.com/l/7".to_string(),
            match_score: 88.0,
            matched_skills: r#"["Python", "AWS"]"#.to_string(),
            red_flags: "[]".to_string(),
            imported_to_opportunities: false,
        };

        let Mutation::ImportJob(payload) = Mutation::import_job(&job) else {
            panic!("expected an import mutation");
        };
        assert_eq!(payload.status, Status::Lead);
        assert_eq!(payload.priority, Priority::High);
        assert!(payload.is_remote);
        assert_eq!(payload.tech_stack, "Python, AWS");
        assert_eq!(payload.source, "remoteok");
        assert_eq!(
            Mutation::ImportJob(payload).resync_targets(),
            [Resource::ScrapedJobs, Resource::Pipeline, Resource::Metrics]
        );
    }

    #[tokio::test]
    async fn test_archive_uses_declined_status() {
        let stub = StubApi::new();
        stub.seed_opportunity(5, "Company E", Status::Applied);

        let mut dash = Dashboard::new(stub.clone(), 60);
        dash.apply(Mutation::Archive { id: 5 }).await.unwrap();

        let archived = stub.archived.lock().unwrap();
        assert_eq!(archived[0].status, Status::Declined);
    }
}
