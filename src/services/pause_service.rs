use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::entities::{
    PauseReason, ResponseState, SlaAuditEvent, SlaAuditLog, SlaPauseHistory, Ticket,
};
use crate::domain::errors::{SlaError, SlaResult};
use crate::domain::ports::{Clock, SlaBackend, SlaRepository, TicketRepository};
use crate::services::{outcome_of, SlaOutcome};

/// Stateless recomputation of whether a ticket's clock should be paused.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PauseEvaluation {
    pub paused: bool,
    pub reason: Option<PauseReason>,
}

/// Read-only pause projection for display.
#[derive(Debug, Clone, Serialize)]
pub struct PauseStats {
    pub is_paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_pause_minutes: i64,
    /// Minutes in the current pause, computed live; zero while running.
    pub current_pause_minutes: i64,
    pub pause_reason: Option<PauseReason>,
}

/// Pause/resume state machine for a ticket's SLA clock.
///
/// Two states only: RUNNING (`paused_at == None`) and PAUSED. Each operation
/// re-reads the ticket before writing; the store must serialize operations
/// per ticket so two triggers cannot both observe "not paused".
#[derive(Clone)]
pub struct SlaPauseService {
    tickets: Arc<dyn TicketRepository>,
    sla_repo: Arc<dyn SlaRepository>,
    backend: Arc<dyn SlaBackend>,
    clock: Arc<dyn Clock>,
}

impl SlaPauseService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        sla_repo: Arc<dyn SlaRepository>,
        backend: Arc<dyn SlaBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            sla_repo,
            backend,
            clock,
        }
    }

    /// Pause the clock. No-op when the ticket has no policy or is already
    /// paused.
    pub async fn pause_sla(
        &self,
        ticket_id: &str,
        reason: PauseReason,
        triggered_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self.try_pause(ticket_id, reason, triggered_by).await;
        outcome_of("pause_sla", ticket_id, result)
    }

    /// Resume the clock, folding the elapsed pause into the accumulator.
    /// No-op when not paused or without a policy.
    pub async fn resume_sla(&self, ticket_id: &str, triggered_by: Option<&str>) -> SlaOutcome {
        let result = self.try_resume(ticket_id, triggered_by).await;
        outcome_of("resume_sla", ticket_id, result)
    }

    /// React to a ticket status transition. Pauses when the new status is
    /// configured to pause or the awaiting-client condition holds; resumes
    /// only when neither condition remains.
    pub async fn handle_status_change(
        &self,
        ticket_id: &str,
        _old_status_id: Option<&str>,
        new_status_id: &str,
        triggered_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self
            .try_handle_status_change(ticket_id, new_status_id, triggered_by)
            .await;
        outcome_of("handle_status_change", ticket_id, result)
    }

    /// React to a response-state transition: entering `awaiting_client`
    /// pauses (settings permitting); leaving it resumes unless the current
    /// status independently requires a pause.
    pub async fn handle_response_state_change(
        &self,
        ticket_id: &str,
        _old_state: ResponseState,
        new_state: ResponseState,
        triggered_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self
            .try_handle_response_state_change(ticket_id, new_state, triggered_by)
            .await;
        outcome_of("handle_response_state_change", ticket_id, result)
    }

    /// Recompute the required pause state from current status,
    /// response state, and tenant settings. Does not read or write
    /// `paused_at`. When both causes hold, the status pause is reported.
    pub async fn should_sla_be_paused(&self, ticket: &Ticket) -> SlaResult<PauseEvaluation> {
        if ticket.sla.policy_id.is_none() {
            return Ok(PauseEvaluation {
                paused: false,
                reason: None,
            });
        }
        let status_pause = match &ticket.status_id {
            Some(status_id) => self.sla_repo.status_pauses_sla(status_id).await?,
            None => false,
        };
        let settings = self.sla_repo.get_settings(&ticket.tenant_id).await?;
        let awaiting_client = ticket.response_state == ResponseState::AwaitingClient
            && settings.pause_on_awaiting_client;

        let reason = if status_pause {
            Some(PauseReason::StatusPause)
        } else if awaiting_client {
            Some(PauseReason::AwaitingClient)
        } else {
            None
        };
        Ok(PauseEvaluation {
            paused: reason.is_some(),
            reason,
        })
    }

    /// Idempotent drift repair: compares the recomputed pause requirement
    /// against actual state and corrects it.
    pub async fn sync_pause_state(&self, ticket_id: &str, triggered_by: Option<&str>) -> SlaOutcome {
        let result = self.try_sync(ticket_id, triggered_by).await;
        outcome_of("sync_pause_state", ticket_id, result)
    }

    pub async fn pause_stats(&self, ticket_id: &str) -> SlaResult<PauseStats> {
        let ticket = self.load_ticket(ticket_id).await?;
        let current_pause_minutes = ticket
            .sla
            .paused_at
            .map(|paused_at| (self.clock.now() - paused_at).num_minutes().max(0))
            .unwrap_or(0);
        let pause_reason = if ticket.sla.is_paused() {
            self.should_sla_be_paused(&ticket).await?.reason
        } else {
            None
        };
        Ok(PauseStats {
            is_paused: ticket.sla.is_paused(),
            paused_at: ticket.sla.paused_at,
            total_pause_minutes: ticket.sla.total_pause_minutes,
            current_pause_minutes,
            pause_reason,
        })
    }

    async fn load_ticket(&self, ticket_id: &str) -> SlaResult<Ticket> {
        self.tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| SlaError::NotFound(format!("Ticket not found: {}", ticket_id)))
    }

    async fn try_pause(
        &self,
        ticket_id: &str,
        reason: PauseReason,
        triggered_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;
        if ticket.sla.policy_id.is_none() || ticket.sla.is_paused() {
            return Ok(false);
        }

        let now = self.clock.now();
        ticket.sla.paused_at = Some(now);
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        self.sla_repo
            .append_pause_history(&SlaPauseHistory::paused(
                ticket_id.to_string(),
                reason,
                triggered_by.map(str::to_string),
            ))
            .await?;
        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::SlaPaused,
                serde_json::json!({ "reason": reason, "paused_at": now }),
                triggered_by.map(str::to_string),
            ))
            .await?;

        if let Err(e) = self.backend.pause_sla(ticket_id).await {
            warn!(ticket_id, error = %e, "SLA backend pause signal failed");
        }

        info!(ticket_id, reason = %reason, "SLA paused");
        Ok(true)
    }

    async fn try_resume(&self, ticket_id: &str, triggered_by: Option<&str>) -> SlaResult<bool> {
        let mut ticket = self.load_ticket(ticket_id).await?;
        let paused_at = match ticket.sla.paused_at {
            Some(paused_at) if ticket.sla.policy_id.is_some() => paused_at,
            _ => return Ok(false),
        };

        let now = self.clock.now();
        let pause_minutes = (now - paused_at).num_minutes().max(0);
        ticket.sla.total_pause_minutes += pause_minutes;
        ticket.sla.paused_at = None;
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        self.sla_repo
            .append_pause_history(&SlaPauseHistory::resumed(
                ticket_id.to_string(),
                pause_minutes,
                triggered_by.map(str::to_string),
            ))
            .await?;
        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::SlaResumed,
                serde_json::json!({
                    "pause_minutes": pause_minutes,
                    "total_pause_minutes": ticket.sla.total_pause_minutes,
                }),
                triggered_by.map(str::to_string),
            ))
            .await?;

        if let Err(e) = self.backend.resume_sla(ticket_id).await {
            warn!(ticket_id, error = %e, "SLA backend resume signal failed");
        }

        info!(ticket_id, pause_minutes, "SLA resumed");
        Ok(true)
    }

    async fn try_handle_status_change(
        &self,
        ticket_id: &str,
        new_status_id: &str,
        triggered_by: Option<&str>,
    ) -> SlaResult<bool> {
        let ticket = self.load_ticket(ticket_id).await?;
        if ticket.sla.policy_id.is_none() {
            return Ok(false);
        }

        let status_pause = self.sla_repo.status_pauses_sla(new_status_id).await?;
        let settings = self.sla_repo.get_settings(&ticket.tenant_id).await?;
        let awaiting_client = ticket.response_state == ResponseState::AwaitingClient
            && settings.pause_on_awaiting_client;
        let pause_required = status_pause || awaiting_client;

        if pause_required && !ticket.sla.is_paused() {
            let reason = if status_pause {
                PauseReason::StatusPause
            } else {
                PauseReason::AwaitingClient
            };
            return self.try_pause(ticket_id, reason, triggered_by).await;
        }
        if !pause_required && ticket.sla.is_paused() {
            return self.try_resume(ticket_id, triggered_by).await;
        }
        Ok(false)
    }

    async fn try_handle_response_state_change(
        &self,
        ticket_id: &str,
        new_state: ResponseState,
        triggered_by: Option<&str>,
    ) -> SlaResult<bool> {
        let ticket = self.load_ticket(ticket_id).await?;
        if ticket.sla.policy_id.is_none() {
            return Ok(false);
        }

        if new_state == ResponseState::AwaitingClient {
            let settings = self.sla_repo.get_settings(&ticket.tenant_id).await?;
            if settings.pause_on_awaiting_client && !ticket.sla.is_paused() {
                return self
                    .try_pause(ticket_id, PauseReason::AwaitingClient, triggered_by)
                    .await;
            }
            return Ok(false);
        }

        // Leaving awaiting_client: resume only if the current status does not
        // itself require a pause.
        if ticket.sla.is_paused() {
            let status_pause = match &ticket.status_id {
                Some(status_id) => self.sla_repo.status_pauses_sla(status_id).await?,
                None => false,
            };
            if !status_pause {
                return self.try_resume(ticket_id, triggered_by).await;
            }
        }
        Ok(false)
    }

    async fn try_sync(&self, ticket_id: &str, triggered_by: Option<&str>) -> SlaResult<bool> {
        let ticket = self.load_ticket(ticket_id).await?;
        let evaluation = self.should_sla_be_paused(&ticket).await?;
        match (evaluation.paused, ticket.sla.is_paused()) {
            (true, false) => {
                let reason = evaluation.reason.unwrap_or(PauseReason::StatusPause);
                self.try_pause(ticket_id, reason, triggered_by).await
            }
            (false, true) => self.try_resume(ticket_id, triggered_by).await,
            _ => Ok(false),
        }
    }
}
