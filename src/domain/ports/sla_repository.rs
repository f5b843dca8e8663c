use crate::domain::entities::{
    BusinessHoursSchedule, EscalationManagerConfig, SlaAuditLog, SlaPauseHistory, SlaPolicy,
    SlaPolicyTarget, SlaSettings,
};
use crate::domain::errors::SlaResult;

/// Repository for SLA configuration and the audit trail.
///
/// Implementations back each operation with the enclosing transaction of the
/// caller; two triggers for the same ticket must never interleave (see the
/// single-writer-per-ticket requirement on `TicketRepository`).
#[async_trait::async_trait]
pub trait SlaRepository: Send + Sync {
    // Policy operations
    async fn create_policy(&self, policy: &SlaPolicy) -> SlaResult<()>;
    async fn get_policy(&self, policy_id: &str) -> SlaResult<Option<SlaPolicy>>;
    async fn get_policy_by_name(&self, tenant_id: &str, name: &str)
        -> SlaResult<Option<SlaPolicy>>;
    /// Policy assigned directly to a client, if any.
    async fn get_policy_for_client(&self, client_id: &str) -> SlaResult<Option<SlaPolicy>>;
    /// Policy assigned to a board, if any.
    async fn get_policy_for_board(&self, board_id: &str) -> SlaResult<Option<SlaPolicy>>;
    async fn get_default_policy(&self, tenant_id: &str) -> SlaResult<Option<SlaPolicy>>;

    // Target operations
    async fn create_target(&self, target: &SlaPolicyTarget) -> SlaResult<()>;
    async fn get_target(
        &self,
        policy_id: &str,
        priority_id: &str,
    ) -> SlaResult<Option<SlaPolicyTarget>>;
    async fn list_targets(&self, policy_id: &str) -> SlaResult<Vec<SlaPolicyTarget>>;

    // Schedule operations
    async fn get_schedule(&self, schedule_id: &str) -> SlaResult<Option<BusinessHoursSchedule>>;
    async fn get_default_schedule(
        &self,
        tenant_id: &str,
    ) -> SlaResult<Option<BusinessHoursSchedule>>;

    // Settings and per-status pause configuration
    async fn get_settings(&self, tenant_id: &str) -> SlaResult<SlaSettings>;
    async fn status_pauses_sla(&self, status_id: &str) -> SlaResult<bool>;

    // Escalation manager configuration (read-only here)
    async fn get_escalation_manager(
        &self,
        board_id: &str,
        level: i32,
    ) -> SlaResult<Option<EscalationManagerConfig>>;

    // Append-only audit trail
    async fn append_audit(&self, entry: &SlaAuditLog) -> SlaResult<()>;
    async fn append_pause_history(&self, entry: &SlaPauseHistory) -> SlaResult<()>;
}
