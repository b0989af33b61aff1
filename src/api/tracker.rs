//! Core tracker endpoints: metrics, agenda, pipeline, sources, opportunities.

use super::{ApiClient, ApiError, CreatedResponse};
use crate::types::{
    AgendaItem, Metrics, NewOpportunity, Opportunity, OpportunityPatch, SourceRecord,
};

impl ApiClient {
    /// `GET /api/metrics`
    pub async fn fetch_metrics(&self) -> Result<Metrics, ApiError> {
        self.get_json("/api/metrics").await
    }

    /// `GET /api/todays-agenda`
    pub async fn fetch_agenda(&self) -> Result<Vec<AgendaItem>, ApiError> {
        self.get_json("/api/todays-agenda").await
    }

    /// `GET /api/pipeline`: active opportunities, priority-ordered.
    pub async fn fetch_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
        self.get_json("/api/pipeline").await
    }

    /// `GET /api/archived-pipeline`: terminal-status opportunities.
    pub async fn fetch_archived_pipeline(&self) -> Result<Vec<Opportunity>, ApiError> {
        self.get_json("/api/archived-pipeline").await
    }

    /// `GET /api/sources`
    pub async fn fetch_sources(&self) -> Result<Vec<SourceRecord>, ApiError> {
        self.get_json("/api/sources").await
    }

    /// `POST /api/add-source`: create a source by name.
    pub async fn create_source(&self, source_name: &str) -> Result<SourceRecord, ApiError> {
        let payload = SourceRecord {
            source_name: source_name.to_string(),
        };
        let _ack: CreatedResponse = self.post_json("/api/add-source", &payload).await?;
        Ok(payload)
    }

    /// `POST /api/add-opportunity`: returns the server-assigned id.
    pub async fn create_opportunity(&self, new: &NewOpportunity) -> Result<i64, ApiError> {
        let ack: CreatedResponse = self.post_json("/api/add-opportunity", new).await?;
        if !ack.success {
            log::warn!("add-opportunity acknowledged without success flag: {}", ack.message);
        }
        log::info!(
            "created opportunity {} ({} / {})",
            ack.id,
            new.company,
            new.role
        );
        Ok(ack.id)
    }

    /// `PATCH /api/update-opportunity/:id`: partial update, returns the
    /// updated record.
    pub async fn patch_opportunity(
        &self,
        id: i64,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, ApiError> {
        self.patch_json(&format!("/api/update-opportunity/{id}"), patch)
            .await
    }
}
