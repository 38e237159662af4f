use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Identity issued by the backend for one submission cycle.
///
/// Both forms are required: the long form correlates with backend records,
/// the short form is what gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub short_id: String,
}

/// Raw backend result body.
///
/// The reporting surface is allowed to evolve between a fully-normalized
/// `records` shape and a compact `columns` + `rows` shape, so every field is
/// optional here and reconciled by [`crate::normalize::normalize`]. Extra
/// fields (`source`, `db_path`, ...) are tolerated and ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Map<String, Value>>>,
    /// Alias for `records` used by some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Map<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Rows are either positional arrays or field-keyed objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Value>>,
}

/// Uniform tabular form every payload shape reconciles into.
///
/// The column list is the single source of truth for display order; records
/// are always read through it, and a field missing from a record renders as
/// an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub columns: Vec<String>,
    pub records: Vec<Map<String, Value>>,
}

impl NormalizedResult {
    /// An empty column list is the valid empty-table state, not an error.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SubmitConfig {
    pub base_url: String,
    pub create_path: String,
    pub submit_path: String,
    pub user_agent: String,
    pub ready_timeout: Duration,
    /// Client-side reference attached to each submission for log correlation.
    pub client_ref: String,
}

/// Events emitted by the orchestrator and consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub enum SubmitEvent {
    /// A submission cycle began: reset the result area, hide the job badge
    /// (purging the stored identity), start the progress ticker, disable the
    /// submit control.
    SubmissionStarted,
    /// The payload is ready to render. `job` is the identity obtained at the
    /// start of the cycle, if any; it must only be disclosed after the table
    /// has been rebuilt from this payload. Cache restores arrive with
    /// `job: None` so a stale identity is never shown.
    ResultReady {
        payload: Box<ResultPayload>,
        job: Option<Job>,
    },
    /// The submission failed; `message` still needs terminal sanitization
    /// before display.
    SubmissionFailed { message: String },
    /// Exit actions for both outcomes: stop the progress ticker and re-enable
    /// the submit control.
    SubmissionFinished,
    Info(InfoEvent),
}

/// Structured info events surfaced on the status line.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    Message(String),
    CacheSaved { path: PathBuf },
    SubmissionInFlight,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::CacheSaved { path } => format!("Cached: {}", path.display()),
            InfoEvent::SubmissionInFlight => "A submission is already running".to_string(),
        }
    }
}
