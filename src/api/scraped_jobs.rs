//! Scraped-job endpoints: the score-filtered listing and its summary counts.

use super::{ApiClient, ApiError};
use crate::types::{ScrapedJob, ScrapedJobStats};

impl ApiClient {
    /// `GET /api/scraped-jobs?min_score=&limit=`
    pub async fn fetch_scraped_jobs(
        &self,
        min_score: u32,
        limit: u32,
    ) -> Result<Vec<ScrapedJob>, ApiError> {
        self.get_json_query(
            "/api/scraped-jobs",
            &[
                ("min_score", min_score.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// `GET /api/scraped-jobs/stats`
    pub async fn fetch_scraped_job_stats(&self) -> Result<ScrapedJobStats, ApiError> {
        self.get_json("/api/scraped-jobs/stats").await
    }
}
