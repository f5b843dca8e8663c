use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::{
    NotificationChannel, SlaAuditEvent, SlaAuditLog, Ticket, TicketResource,
};
use crate::domain::errors::{SlaError, SlaResult};
use crate::domain::ports::{
    Clock, NotificationSender, SlaRepository, TicketRepository, UserRepository,
};
use crate::services::{outcome_of, SlaOutcome};

/// Threshold-driven escalation: level detection, manager assignment, and
/// notification fan-out.
///
/// Escalation is monotonic per ticket. Levels only move upward; re-checking
/// with the same elapsed percentage is a no-op once the level is recorded.
#[derive(Clone)]
pub struct EscalationService {
    sla_repo: Arc<dyn SlaRepository>,
    tickets: Arc<dyn TicketRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
    app_base_url: String,
}

impl EscalationService {
    pub fn new(
        sla_repo: Arc<dyn SlaRepository>,
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        app_base_url: String,
    ) -> Self {
        Self {
            sla_repo,
            tickets,
            users,
            notifier,
            clock,
            app_base_url,
        }
    }

    /// The highest configured level whose threshold the elapsed percentage
    /// has crossed, when it is above the ticket's current level. Returns
    /// `None` when no escalation is due.
    pub async fn check_escalation_needed(
        &self,
        ticket: &Ticket,
        elapsed_percent: f64,
    ) -> SlaResult<Option<i32>> {
        let policy_id = match &ticket.sla.policy_id {
            Some(policy_id) => policy_id,
            None => return Ok(None),
        };
        let priority_id = match &ticket.priority_id {
            Some(priority_id) => priority_id,
            None => return Ok(None),
        };
        let target = match self.sla_repo.get_target(policy_id, priority_id).await? {
            Some(target) => target,
            None => return Ok(None),
        };

        // Highest level first, so crossing multiple thresholds at once jumps
        // straight to the deepest one.
        for level in [3, 2, 1] {
            if let Some(threshold) = target.threshold_for_level(level) {
                if elapsed_percent >= threshold && level > ticket.sla.escalation_level {
                    return Ok(Some(level));
                }
            }
        }
        Ok(None)
    }

    /// Escalate to `new_level`: record the level on the ticket, assign the
    /// configured manager as a ticket resource, and notify them on their
    /// configured channels. Recording the level is the primary effect;
    /// manager assignment and notifications are best-effort on top of it.
    pub async fn escalate_ticket(
        &self,
        ticket_id: &str,
        new_level: i32,
        escalated_by: Option<&str>,
    ) -> SlaOutcome {
        let result = self.try_escalate(ticket_id, new_level, escalated_by).await;
        outcome_of("escalate_ticket", ticket_id, result)
    }

    async fn try_escalate(
        &self,
        ticket_id: &str,
        new_level: i32,
        escalated_by: Option<&str>,
    ) -> SlaResult<bool> {
        let mut ticket = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| SlaError::NotFound(format!("Ticket not found: {}", ticket_id)))?;

        if ticket.sla.escalation_level >= new_level {
            return Ok(false);
        }

        let now = self.clock.now();
        ticket.sla.escalation_level = new_level;
        ticket.sla.escalated = true;
        ticket.sla.escalated_at = Some(now);
        ticket.sla.escalated_by = escalated_by.map(str::to_string);
        self.tickets.update_ticket_sla(ticket_id, &ticket.sla).await?;

        let manager = match &ticket.board_id {
            Some(board_id) => {
                self.sla_repo
                    .get_escalation_manager(board_id, new_level)
                    .await?
            }
            None => None,
        };

        let mut resource_added = false;
        let mut notifications = serde_json::Map::new();
        if let Some(manager) = &manager {
            resource_added = self
                .assign_manager_resource(&ticket, &manager.manager_user_id, new_level)
                .await;
            for channel in &manager.notify_channels {
                let delivered = self
                    .notify_manager(&ticket, &manager.manager_user_id, *channel, new_level)
                    .await;
                notifications.insert(channel.to_string(), serde_json::json!(delivered));
            }
        } else {
            info!(ticket_id, new_level, "No escalation manager configured");
        }

        self.sla_repo
            .append_audit(&SlaAuditLog::new(
                ticket_id.to_string(),
                SlaAuditEvent::Escalated,
                serde_json::json!({
                    "level": new_level,
                    "manager_found": manager.is_some(),
                    "resource_added": resource_added,
                    "notifications": notifications,
                }),
                escalated_by.map(str::to_string),
            ))
            .await?;

        info!(ticket_id, new_level, "Ticket escalated");
        Ok(true)
    }

    /// Attach the manager to the ticket, or bump their role if they are
    /// already a resource. Failures are logged and reported, never raised.
    async fn assign_manager_resource(&self, ticket: &Ticket, user_id: &str, level: i32) -> bool {
        let role = format!("Escalation Manager (Level {})", level);
        let result = async {
            let resources = self.tickets.get_resources(&ticket.id).await?;
            match resources.iter().find(|r| r.user_id == user_id) {
                Some(existing) => {
                    self.tickets.update_resource_role(&existing.id, &role).await
                }
                None => {
                    let resource =
                        TicketResource::new(ticket.id.clone(), user_id.to_string(), role);
                    self.tickets.add_resource(&resource).await
                }
            }
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(ticket_id = %ticket.id, user_id, error = %e, "Failed to assign escalation manager");
                false
            }
        }
    }

    /// Deliver one channel's notification; channels fail independently.
    async fn notify_manager(
        &self,
        ticket: &Ticket,
        user_id: &str,
        channel: NotificationChannel,
        level: i32,
    ) -> bool {
        let ticket_url = format!("{}/tickets/{}", self.app_base_url, ticket.id);
        let data = serde_json::json!({
            "ticket_id": ticket.id,
            "ticket_number": ticket.ticket_number,
            "title": ticket.title,
            "escalation_level": level,
            "priority_id": ticket.priority_id,
            "client_id": ticket.client_id,
            "assigned_to": ticket.assigned_to,
            "url": ticket_url,
        });

        let result = match channel {
            NotificationChannel::InApp => {
                let title = format!("SLA escalation (level {})", level);
                let message = format!(
                    "Ticket #{} \"{}\" has been escalated to level {}",
                    ticket.ticket_number, ticket.title, level
                );
                self.notifier
                    .send_in_app(user_id, &title, &message, data)
                    .await
            }
            NotificationChannel::Email => match self.lookup_email(user_id).await {
                Some(email) => {
                    self.notifier
                        .send_email(user_id, &email, "sla_escalation", data)
                        .await
                }
                None => {
                    warn!(user_id, "Escalation manager has no email address");
                    return false;
                }
            },
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(ticket_id = %ticket.id, user_id, channel = %channel, error = %e, "Escalation notification failed");
                false
            }
        }
    }

    async fn lookup_email(&self, user_id: &str) -> Option<String> {
        match self.users.get_user(user_id).await {
            Ok(Some(user)) => user.email,
            Ok(None) => None,
            Err(e) => {
                warn!(user_id, error = %e, "User lookup failed");
                None
            }
        }
    }
}
