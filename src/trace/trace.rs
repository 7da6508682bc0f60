use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::surface::surface_model::RegionId;

/// One JSONL record of pipeline progress.
///
/// Stages: `region_observed`, `sublayer_watch`, `extract`, `batch_sent`,
/// `batch_failed`, `fill_applied`.
#[derive(Debug, Serialize)]
pub struct PipelineEvent {
    pub timestamp_ms: u128,
    pub stage: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PipelineEvent {
    pub fn stage(stage: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            stage: stage.to_string(),
            region: None,
            count: None,
            batch_index: None,
            detail: None,
        }
    }

    pub fn with_region(mut self, region: &RegionId) -> Self {
        self.region = Some(region.0.clone());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_batch_index(mut self, batch_index: usize) -> Self {
        self.batch_index = Some(batch_index);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
