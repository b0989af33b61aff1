//! Sacred-work endpoints: the append-only progress log and its aggregates.

use super::{ApiClient, ApiError, CreatedResponse};
use crate::types::{NewStone, SacredStone, SacredWorkStats};

impl ApiClient {
    /// `GET /api/sacred-work-stats`
    pub async fn fetch_sacred_work_stats(&self) -> Result<SacredWorkStats, ApiError> {
        self.get_json("/api/sacred-work-stats").await
    }

    /// `GET /api/sacred-work-progress`: all stones, ascending by number.
    pub async fn fetch_sacred_work_progress(&self) -> Result<Vec<SacredStone>, ApiError> {
        self.get_json("/api/sacred-work-progress").await
    }

    /// `GET /api/recent-sacred-work`: the latest few log entries.
    pub async fn fetch_recent_sacred_work(&self) -> Result<Vec<SacredStone>, ApiError> {
        self.get_json("/api/recent-sacred-work").await
    }

    /// `POST /api/add-sacred-work`
    ///
    /// The server rejects duplicate stone numbers with 409; the reason rides
    /// back in [`ApiError::Api`].
    pub async fn create_stone(&self, stone: &NewStone) -> Result<i64, ApiError> {
        let ack: CreatedResponse = self.post_json("/api/add-sacred-work", stone).await?;
        if !ack.success {
            log::warn!("add-sacred-work acknowledged without success flag: {}", ack.message);
        }
        log::info!("placed stone {} ({})", stone.stone_number, stone.stone_title);
        Ok(ack.id)
    }
}
