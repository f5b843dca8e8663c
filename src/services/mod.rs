pub mod business_hours;
pub mod escalation_service;
pub mod itil_service;
pub mod lifecycle_service;
pub mod pause_service;

pub use escalation_service::EscalationService;
pub use itil_service::{ItilAutoConfigService, ItilPriorityMapping, ITIL_POLICY_NAME};
pub use lifecycle_service::{MilestoneStatus, SlaHealth, SlaLifecycleService, SlaStatusReport};
pub use pause_service::{PauseEvaluation, PauseStats, SlaPauseService};

use serde::Serialize;

/// Result object for mutating SLA operations.
///
/// SLA bookkeeping is best-effort relative to the ticket mutation it
/// accompanies: failures are logged and reported here instead of propagating,
/// so they never abort the caller's transaction. `AlreadyInTargetState`
/// outcomes are `success: true, changed: false`.
#[derive(Debug, Clone, Serialize)]
pub struct SlaOutcome {
    pub success: bool,
    pub changed: bool,
    pub error: Option<String>,
}

impl SlaOutcome {
    pub fn changed() -> Self {
        Self {
            success: true,
            changed: true,
            error: None,
        }
    }

    pub fn unchanged() -> Self {
        Self {
            success: true,
            changed: false,
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            changed: false,
            error: Some(error.to_string()),
        }
    }
}

pub(crate) fn outcome_of(
    operation: &str,
    ticket_id: &str,
    result: crate::domain::SlaResult<bool>,
) -> SlaOutcome {
    match result {
        Ok(true) => SlaOutcome::changed(),
        Ok(false) => SlaOutcome::unchanged(),
        Err(e) => {
            tracing::error!(ticket_id, operation, error = %e, "SLA operation failed");
            SlaOutcome::failed(e)
        }
    }
}
