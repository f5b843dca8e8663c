use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::entities::{
    BusinessHoursSchedule, SlaAuditEvent, SlaAuditLog, SlaPolicy, SlaPolicyTarget, Ticket,
};
use crate::domain::errors::{SlaError, SlaResult};
use crate::domain::ports::{Clock, SlaBackend, SlaKind, SlaRepository, TicketRepository};
use crate::services::business_hours::{calculate_deadline, format_remaining_time};
use crate::services::{outcome_of, SlaOutcome};

/// Overall SLA health for a ticket. Pause dominates breach in the ordering:
/// a paused clock cannot be actively breaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaHealth {
    NoSla,
    Paused,
    ResponseBreached,
    ResolutionBreached,
    AtRisk,
    OnTrack,
}

/// Live view of one milestone (response or resolution).
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneStatus {
    pub due_at: DateTime<Utc>,
    /// Due date shifted forward by all effective pause minutes.
    pub effective_due_at: DateTime<Utc>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub met: Option<bool>,
    /// Wall-clock minutes until the effective due date; None once recorded.
    pub remaining_minutes: Option<i64>,
    /// Percentage of the original target window consumed; None once recorded.
    pub elapsed_percent: Option<f64>,
    pub remaining_display: Option<String>,
    /// Original target window in minutes (due - started).
    pub window_minutes: i64,
}

impl MilestoneStatus {
    fn breached(&self) -> bool {
        self.met == Some(false)
            || (self.recorded_at.is_none() && self.remaining_minutes.map_or(false, |r| r < 0))
    }

    fn at_risk(&self) -> bool {
        // Remaining at or below 25% of the original window.
        self.recorded_at.is_none()
            && self
                .remaining_minutes
                .map_or(false, |r| r >= 0 && r * 4 <= self.window_minutes)
    }
}

/// Live SLA status computation for a ticket.
#[derive(Debug, Clone, Serialize)]
pub struct SlaStatusReport {
    pub ticket_id: String,
    pub health: SlaHealth,
    pub is_paused: bool,
    /// Stored pause minutes plus the live current pause, if any.
    pub effective_pause_minutes: i64,
    pub response: Option<MilestoneStatus>,
    pub resolution: Option<MilestoneStatus>,
}

impl SlaStatusReport {
    /// Highest elapsed percentage across the milestones still on the clock;
    /// the escalation poller feeds this to `check_escalation_needed`.
    pub fn escalation_elapsed_percent(&self) -> Option<f64> {
        let mut worst: Option<f64> = None;
        for milestone in [self.response.as_ref(), self.resolution.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Some(percent) = milestone.elapsed_percent {
                worst = Some(worst.map_or(percent, |w: f64| w.max(percent)));
            }
        }
        worst
    }
}

/// Orchestrates policy resolution, due-date calculation, milestone recording,
/// live status computation, and priority-change recalculation.
#[derive(Clone)]
pub struct SlaLifecycleService {
    sla_repo: Arc<dyn SlaRepository>,
    tickets: Arc<dyn TicketRepository>,
    backend: Arc<dyn SlaBackend>,
    clock: Arc<dyn Clock>,
}

impl SlaLifecycleService {
    pub fn new(
        sla_repo: Arc<dyn SlaRepository>,
        tickets: Arc<dyn TicketRepository>,
        backend: Arc<dyn SlaBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sla_repo,
            tickets,
            backend,
            clock,
        }
    }

    /// Resolve the applicable policy and compute due dates at ticket
    /// creation. A ticket with no resolvable policy simply has no SLA;
    /// a policy without a target for the ticket's priority records the
    /// policy and start time with due dates left unset.
    pub async fn start_sla_for_ticket(
        &self,
        ticket_id: &str,
        created_at: DateTime<Utc>,
        triggered_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self.try_start(ticket_id, created_at, triggered_by).await;
        outcome_of("start_sla_for_ticket", ticket_id, result)
    }

    /// Record the first agent response. The due date is shifted forward by
    /// all accumulated pause minutes before the met comparison: pause stops
    /// the clock.
    pub async fn record_first_response(
        &self,
        ticket_id: &str,
        responded_at: DateTime<Utc>,
        responded_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self
            .try_record_first_response(ticket_id, responded_at, responded_by)
            .await;
        outcome_of("record_first_response", ticket_id, result)
    }

    /// Record resolution; symmetric to response recording.
    pub async fn record_resolution(
        &self,
        ticket_id: &str,
        resolved_at: DateTime<Utc>,
        resolved_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self
            .try_record_resolution(ticket_id, resolved_at, resolved_by)
            .await;
        outcome_of("record_resolution", ticket_id, result)
    }

    /// Live status computation from the ticket's SLA fields.
    pub async fn get_sla_status(&self, ticket_id: &str) -> SlaResult<SlaStatusReport> {
        let ticket = self.load_ticket(ticket_id).await?;
        let now = self.clock.now();
        Ok(self.build_status(&ticket, now))
    }

    /// Re-resolve the target for a new priority and recompute due dates from
    /// the original start time. Milestones already recorded are frozen.
    pub async fn handle_priority_change(
        &self,
        ticket_id: &str,
        new_priority_id: &str,
        changed_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self
            .try_priority_change(ticket_id, new_priority_id, changed_by)
            .await;
        outcome_of("handle_priority_change", ticket_id, result)
    }

    async fn load_ticket(&self, ticket_id: &str) -> SlaResult<Ticket> {
        self.tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| SlaError::NotFound(format!("Ticket not found: {}", ticket_id)))
    }

    /// Policy precedence: client-specific, then board-specific, then tenant
    /// default. First hit wins.
    async fn resolve_policy(&self, ticket: &Ticket) -> SlaResult<Option<SlaPolicy>> {
        if let Some(client_id) = &ticket.client_id {
            if let Some(policy) = self.sla_repo.get_policy_for_client(client_id).await? {
                return Ok(Some(policy));
            }
        }
        if let Some(board_id) = &ticket.board_id {
            if let Some(policy) = self.sla_repo.get_policy_for_board(board_id).await? {
                return Ok(Some(policy));
            }
        }
        self.sla_repo.get_default_policy(&ticket.tenant_id).await
    }

    /// Schedule selection: a 24x7 target overrides everything; then the
    /// policy's schedule, then the tenant default, then a 24x7 fallback — a
    /// ticket is never left without a usable schedule.
    async fn resolve_schedule(
        &self,
        policy: &SlaPolicy,
        target: &SlaPolicyTarget,
        tenant_id: &str,
    ) -> SlaResult<BusinessHoursSchedule> {
        if target.is_24x7 {
            return Ok(BusinessHoursSchedule::around_the_clock());
        }
        if let Some(schedule_id) = &policy.business_hours_schedule_id {
            match self.sla_repo.get_schedule(schedule_id).await? {
                Some(schedule) => return Ok(schedule),
                None => {
                    warn!(policy_id = %policy.id, schedule_id = %schedule_id, "Policy references a missing schedule");
                }
            }
        }
        if let Some(schedule) = self.sla_repo.get_default_schedule(tenant_id).await? {
            return Ok(schedule);
        }
        warn!(tenant_id, "No business-hours schedule configured; using 24x7");
        Ok(BusinessHoursSchedule::around_the_clock())
    }

    async fn try_start(
        &self,
        ticket_id: &str,
        created_at: DateTime<Utc>,
        triggered_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;

        let policy = match self.resolve_policy(&ticket).await? {
            Some(policy) => policy,
            None => {
                info!(ticket_id, "No SLA policy applicable");
                return Ok(false);
            }
        };

        ticket.sla.policy_id = Some(policy.id.clone());
        ticket.sla.started_at = Some(created_at);

        let target = match &ticket.priority_id {
            Some(priority_id) => self.sla_repo.get_target(&policy.id, priority_id).await?,
            None => None,
        };

        match &target {
            Some(target) => {
                let schedule = self
                    .resolve_schedule(&policy, target, &ticket.tenant_id)
                    .await?;
                ticket.sla.response_due_at = target
                    .response_minutes
                    .map(|minutes| calculate_deadline(&schedule, created_at, minutes));
                ticket.sla.resolution_due_at = target
                    .resolution_minutes
                    .map(|minutes| calculate_deadline(&schedule, created_at, minutes));
            }
            None => {
                info!(
                    ticket_id,
                    policy_id = %policy.id,
                    priority_id = ticket.priority_id.as_deref().unwrap_or("none"),
                    "No SLA target for priority; due dates left unset"
                );
            }
        }

        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;
        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::SlaStarted,
                serde_json::json!({
                    "policy_id": policy.id,
                    "priority_id": ticket.priority_id,
                    "started_at": created_at,
                    "response_due_at": ticket.sla.response_due_at,
                    "resolution_due_at": ticket.sla.resolution_due_at,
                }),
                triggered_by.map(str::to_string),
            ))
            .await?;

        if let Err(e) = self
            .backend
            .start_sla_tracking(
                ticket_id,
                ticket.sla.response_due_at,
                ticket.sla.resolution_due_at,
            )
            .await
        {
            warn!(ticket_id, error = %e, "SLA backend start signal failed");
        }

        info!(
            ticket_id,
            policy_id = %policy.id,
            response_due = ?ticket.sla.response_due_at,
            resolution_due = ?ticket.sla.resolution_due_at,
            "SLA started"
        );
        Ok(true)
    }

    async fn try_record_first_response(
        &self,
        ticket_id: &str,
        responded_at: DateTime<Utc>,
        responded_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;
        if ticket.sla.policy_id.is_none() || ticket.sla.response_at.is_some() {
            return Ok(false);
        }

        let met = ticket.sla.response_due_at.map(|due| {
            responded_at <= due + Duration::minutes(ticket.sla.total_pause_minutes)
        });
        ticket.sla.response_at = Some(responded_at);
        ticket.sla.response_met = met;
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::ResponseRecorded,
                serde_json::json!({
                    "responded_at": responded_at,
                    "met": met,
                    "total_pause_minutes": ticket.sla.total_pause_minutes,
                }),
                responded_by.map(str::to_string),
            ))
            .await?;

        if let Err(e) = self
            .backend
            .complete_sla(ticket_id, SlaKind::Response, met.unwrap_or(true))
            .await
        {
            warn!(ticket_id, error = %e, "SLA backend response-complete signal failed");
        }

        info!(ticket_id, met = ?met, "First response recorded");
        Ok(true)
    }

    async fn try_record_resolution(
        &self,
        ticket_id: &str,
        resolved_at: DateTime<Utc>,
        resolved_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;
        if ticket.sla.policy_id.is_none() || ticket.sla.resolution_at.is_some() {
            return Ok(false);
        }

        let met = ticket.sla.resolution_due_at.map(|due| {
            resolved_at <= due + Duration::minutes(ticket.sla.total_pause_minutes)
        });
        ticket.sla.resolution_at = Some(resolved_at);
        ticket.sla.resolution_met = met;
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::ResolutionRecorded,
                serde_json::json!({
                    "resolved_at": resolved_at,
                    "met": met,
                    "total_pause_minutes": ticket.sla.total_pause_minutes,
                }),
                resolved_by.map(str::to_string),
            ))
            .await?;

        if let Err(e) = self
            .backend
            .complete_sla(ticket_id, SlaKind::Resolution, met.unwrap_or(true))
            .await
        {
            warn!(ticket_id, error = %e, "SLA backend resolution-complete signal failed");
        }

        info!(ticket_id, met = ?met, "Resolution recorded");
        Ok(true)
    }

    fn build_status(&self, ticket: &Ticket, now: DateTime<Utc>) -> SlaStatusReport {
        if ticket.sla.policy_id.is_none() {
            return SlaStatusReport {
                ticket_id: ticket.id.clone(),
                health: SlaHealth::NoSla,
                is_paused: false,
                effective_pause_minutes: 0,
                response: None,
                resolution: None,
            };
        }

        let live_pause = ticket
            .sla
            .paused_at
            .map(|paused_at| (now - paused_at).num_minutes().max(0))
            .unwrap_or(0);
        let effective_pause = ticket.sla.total_pause_minutes + live_pause;

        let response = ticket.sla.started_at.and_then(|started_at| {
            ticket.sla.response_due_at.map(|due| {
                milestone_status(
                    started_at,
                    due,
                    ticket.sla.response_at,
                    ticket.sla.response_met,
                    effective_pause,
                    now,
                )
            })
        });
        let resolution = ticket.sla.started_at.and_then(|started_at| {
            ticket.sla.resolution_due_at.map(|due| {
                milestone_status(
                    started_at,
                    due,
                    ticket.sla.resolution_at,
                    ticket.sla.resolution_met,
                    effective_pause,
                    now,
                )
            })
        });

        let is_paused = ticket.sla.is_paused();
        let health = if is_paused {
            SlaHealth::Paused
        } else if response.as_ref().map_or(false, MilestoneStatus::breached) {
            SlaHealth::ResponseBreached
        } else if resolution.as_ref().map_or(false, MilestoneStatus::breached) {
            SlaHealth::ResolutionBreached
        } else if response.as_ref().map_or(false, MilestoneStatus::at_risk)
            || resolution.as_ref().map_or(false, MilestoneStatus::at_risk)
        {
            SlaHealth::AtRisk
        } else {
            SlaHealth::OnTrack
        };

        SlaStatusReport {
            ticket_id: ticket.id.clone(),
            health,
            is_paused,
            effective_pause_minutes: effective_pause,
            response,
            resolution,
        }
    }

    async fn try_priority_change(
        &self,
        ticket_id: &str,
        new_priority_id: &str,
        changed_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;
        let (policy_id, started_at) = match (&ticket.sla.policy_id, ticket.sla.started_at) {
            (Some(policy_id), Some(started_at)) => (policy_id.clone(), started_at),
            _ => return Ok(false),
        };
        if ticket.sla.response_at.is_some() && ticket.sla.resolution_at.is_some() {
            // Both milestones frozen; nothing to recompute.
            return Ok(false);
        }

        let policy = self
            .sla_repo
            .get_policy(&policy_id)
            .await?
            .ok_or_else(|| SlaError::NotFound(format!("SLA policy not found: {}", policy_id)))?;
        let target = self.sla_repo.get_target(&policy_id, new_priority_id).await?;

        let (response_due, resolution_due) = match &target {
            Some(target) => {
                let schedule = self
                    .resolve_schedule(&policy, target, &ticket.tenant_id)
                    .await?;
                (
                    target
                        .response_minutes
                        .map(|minutes| calculate_deadline(&schedule, started_at, minutes)),
                    target
                        .resolution_minutes
                        .map(|minutes| calculate_deadline(&schedule, started_at, minutes)),
                )
            }
            None => (None, None),
        };

        let old_priority = ticket.priority_id.clone();
        if ticket.sla.response_at.is_none() {
            ticket.sla.response_due_at = response_due;
        }
        if ticket.sla.resolution_at.is_none() {
            ticket.sla.resolution_due_at = resolution_due;
        }
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::PriorityChanged,
                serde_json::json!({
                    "old_priority_id": old_priority,
                    "new_priority_id": new_priority_id,
                    "response_due_at": ticket.sla.response_due_at,
                    "resolution_due_at": ticket.sla.resolution_due_at,
                }),
                changed_by.map(str::to_string),
            ))
            .await?;

        info!(
            ticket_id,
            new_priority_id,
            response_due = ?ticket.sla.response_due_at,
            resolution_due = ?ticket.sla.resolution_due_at,
            "SLA due dates recomputed for priority change"
        );
        Ok(true)
    }
}

fn milestone_status(
    started_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    recorded_at: Option<DateTime<Utc>>,
    met: Option<bool>,
    effective_pause_minutes: i64,
    now: DateTime<Utc>,
) -> MilestoneStatus {
    let effective_due_at = due_at + Duration::minutes(effective_pause_minutes);
    let window_minutes = (due_at - started_at).num_minutes().max(1);

    let (remaining_minutes, elapsed_percent, remaining_display) = if recorded_at.is_some() {
        (None, None, None)
    } else {
        let remaining = (effective_due_at - now).num_minutes();
        let percent =
            ((window_minutes - remaining) as f64 / window_minutes as f64 * 100.0).max(0.0);
        (
            Some(remaining),
            Some(percent),
            Some(format_remaining_time(remaining)),
        )
    };

    MilestoneStatus {
        due_at,
        effective_due_at,
        recorded_at,
        met,
        remaining_minutes,
        elapsed_percent,
        remaining_display,
        window_minutes,
    }
}
