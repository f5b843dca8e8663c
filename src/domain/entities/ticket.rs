use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of a ticket this subsystem reads. Ticket CRUD itself lives with
/// the surrounding product; only the `sla` block is owned and mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub tenant_id: String,
    pub ticket_number: i64,
    pub title: String,
    pub board_id: Option<String>,
    pub client_id: Option<String>,
    pub priority_id: Option<String>,
    pub status_id: Option<String>,
    pub response_state: ResponseState,
    pub assigned_to: Option<String>,
    pub sla: TicketSla,
}

/// SLA bookkeeping fields embedded in the ticket entity.
///
/// `paused_at == None` means the clock is running. `total_pause_minutes` is a
/// monotonic accumulator; it is never reset except by an explicit re-start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketSla {
    pub policy_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub response_due_at: Option<DateTime<Utc>>,
    pub response_at: Option<DateTime<Utc>>,
    pub response_met: Option<bool>,
    pub resolution_due_at: Option<DateTime<Utc>>,
    pub resolution_at: Option<DateTime<Utc>>,
    pub resolution_met: Option<bool>,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_pause_minutes: i64,
    pub escalation_level: i32,
    pub escalated: bool,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalated_by: Option<String>,
}

impl TicketSla {
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

/// Whether the ball is with the agent or the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    AwaitingAgent,
    AwaitingClient,
}

impl std::fmt::Display for ResponseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseState::AwaitingAgent => write!(f, "awaiting_agent"),
            ResponseState::AwaitingClient => write!(f, "awaiting_client"),
        }
    }
}

impl std::str::FromStr for ResponseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "awaiting_agent" => Ok(ResponseState::AwaitingAgent),
            "awaiting_client" => Ok(ResponseState::AwaitingClient),
            _ => Err(format!("Invalid response state: {}", s)),
        }
    }
}

/// A user attached to a ticket in some role; escalation managers are added
/// as resources when a threshold fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResource {
    pub id: String,
    pub ticket_id: String,
    pub user_id: String,
    pub role: String,
    pub added_at: DateTime<Utc>,
}

impl TicketResource {
    pub fn new(ticket_id: String, user_id: String, role: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id,
            user_id,
            role,
            added_at: Utc::now(),
        }
    }
}
