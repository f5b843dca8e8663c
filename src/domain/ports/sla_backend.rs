use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::SlaResult;

/// Which SLA milestone a completion signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaKind {
    Response,
    Resolution,
}

impl std::fmt::Display for SlaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaKind::Response => write!(f, "response"),
            SlaKind::Resolution => write!(f, "resolution"),
        }
    }
}

/// Side channel to a durable-execution backend (e.g. a distributed timer
/// service firing breach alarms independently).
///
/// The core's correctness never depends on these calls: services log backend
/// failures and carry on. Resolved once at wiring time via
/// `infrastructure::backend::resolve_sla_backend` and injected into the
/// lifecycle and pause services.
#[async_trait::async_trait]
pub trait SlaBackend: Send + Sync {
    async fn start_sla_tracking(
        &self,
        ticket_id: &str,
        response_due_at: Option<DateTime<Utc>>,
        resolution_due_at: Option<DateTime<Utc>>,
    ) -> SlaResult<()>;

    async fn pause_sla(&self, ticket_id: &str) -> SlaResult<()>;
    async fn resume_sla(&self, ticket_id: &str) -> SlaResult<()>;
    async fn complete_sla(&self, ticket_id: &str, kind: SlaKind, met: bool) -> SlaResult<()>;
    async fn cancel_sla(&self, ticket_id: &str) -> SlaResult<()>;
    async fn get_sla_status(&self, ticket_id: &str) -> SlaResult<Option<serde_json::Value>>;
}
