use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit entry for SLA lifecycle events. Never mutated after
/// insert; used for reconstruction and diagnostics, not runtime decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaAuditLog {
    pub id: String,
    pub ticket_id: String,
    pub event: SlaAuditEvent,
    pub event_data: serde_json::Value,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SlaAuditLog {
    pub fn new(
        ticket_id: String,
        event: SlaAuditEvent,
        event_data: serde_json::Value,
        triggered_by: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id,
            event,
            event_data,
            triggered_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaAuditEvent {
    SlaStarted,
    SlaPaused,
    SlaResumed,
    ResponseRecorded,
    ResolutionRecorded,
    PriorityChanged,
    Escalated,
}

impl std::fmt::Display for SlaAuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaAuditEvent::SlaStarted => write!(f, "sla_started"),
            SlaAuditEvent::SlaPaused => write!(f, "sla_paused"),
            SlaAuditEvent::SlaResumed => write!(f, "sla_resumed"),
            SlaAuditEvent::ResponseRecorded => write!(f, "response_recorded"),
            SlaAuditEvent::ResolutionRecorded => write!(f, "resolution_recorded"),
            SlaAuditEvent::PriorityChanged => write!(f, "priority_changed"),
            SlaAuditEvent::Escalated => write!(f, "escalated"),
        }
    }
}

/// Append-only pause/resume trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPauseHistory {
    pub id: String,
    pub ticket_id: String,
    pub action: PauseAction,
    pub reason: Option<PauseReason>,
    /// Accumulated minutes for a resume entry; None for a pause entry.
    pub pause_minutes: Option<i64>,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SlaPauseHistory {
    pub fn paused(ticket_id: String, reason: PauseReason, triggered_by: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id,
            action: PauseAction::Paused,
            reason: Some(reason),
            pause_minutes: None,
            triggered_by,
            created_at: Utc::now(),
        }
    }

    pub fn resumed(ticket_id: String, pause_minutes: i64, triggered_by: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id,
            action: PauseAction::Resumed,
            reason: None,
            pause_minutes: Some(pause_minutes),
            triggered_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseAction {
    Paused,
    Resumed,
}

/// Why the clock stopped. Closed set; invalid reasons are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    AwaitingClient,
    StatusPause,
}

impl std::fmt::Display for PauseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PauseReason::AwaitingClient => write!(f, "awaiting_client"),
            PauseReason::StatusPause => write!(f, "status_pause"),
        }
    }
}

impl std::str::FromStr for PauseReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "awaiting_client" => Ok(PauseReason::AwaitingClient),
            "status_pause" => Ok(PauseReason::StatusPause),
            _ => Err(format!("Invalid pause reason: {}", s)),
        }
    }
}
