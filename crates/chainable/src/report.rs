//! Run Report: per-link record of a chain run
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Progress of one `unwrap` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Running { link_index: usize },
    Completed,
    Failed { link_index: usize },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    pub index: usize,
    /// Function name, or `None` when the element isn't a function
    pub name: Option<String>,
    pub handle_error: bool,
    pub n_args: usize,
    pub n_outputs: usize,
    pub latency_ms: u64,
    pub failed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub chain: Option<String>,
    pub pipeline_id: String,
    pub started_at: DateTime<Utc>,
    pub state: RunState,
    pub links: Vec<LinkRecord>,
}

impl RunReport {
    pub(crate) fn new(chain: Option<String>, pipeline_id: String) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            chain,
            pipeline_id,
            started_at: Utc::now(),
            state: RunState::Pending,
            links: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
