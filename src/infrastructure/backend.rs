use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::errors::SlaResult;
use crate::domain::ports::{SlaBackend, SlaKind};

/// The default backend. All state already lives on the ticket row and in the
/// audit tables, so the signals here only need trace-level visibility;
/// breach detection runs off the stored due dates via polling.
#[derive(Debug, Default, Clone)]
pub struct DatabaseSlaBackend;

impl DatabaseSlaBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SlaBackend for DatabaseSlaBackend {
    async fn start_sla_tracking(
        &self,
        ticket_id: &str,
        response_due_at: Option<DateTime<Utc>>,
        resolution_due_at: Option<DateTime<Utc>>,
    ) -> SlaResult<()> {
        debug!(
            ticket_id,
            response_due = ?response_due_at,
            resolution_due = ?resolution_due_at,
            "SLA tracking started"
        );
        Ok(())
    }

    async fn pause_sla(&self, ticket_id: &str) -> SlaResult<()> {
        debug!(ticket_id, "SLA tracking paused");
        Ok(())
    }

    async fn resume_sla(&self, ticket_id: &str) -> SlaResult<()> {
        debug!(ticket_id, "SLA tracking resumed");
        Ok(())
    }

    async fn complete_sla(&self, ticket_id: &str, kind: SlaKind, met: bool) -> SlaResult<()> {
        debug!(ticket_id, kind = %kind, met, "SLA milestone completed");
        Ok(())
    }

    async fn cancel_sla(&self, ticket_id: &str) -> SlaResult<()> {
        debug!(ticket_id, "SLA tracking cancelled");
        Ok(())
    }

    async fn get_sla_status(&self, _ticket_id: &str) -> SlaResult<Option<serde_json::Value>> {
        // No external state to report; callers read the ticket row instead.
        Ok(None)
    }
}

/// Pick the backend named in configuration. Unknown or not-yet-wired
/// backends fall back to the database backend with a warning rather than
/// failing startup.
pub fn resolve_sla_backend(config: &Config) -> Arc<dyn SlaBackend> {
    match config.sla_backend.as_str() {
        "database" => Arc::new(DatabaseSlaBackend::new()),
        other => {
            warn!(
                backend = other,
                "Unknown SLA backend; falling back to database backend"
            );
            Arc::new(DatabaseSlaBackend::new())
        }
    }
}
