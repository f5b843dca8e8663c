use serde::{Deserialize, Serialize};

/// Per (board, escalation level) mapping to a manager and their notification
/// channels. Configured elsewhere; this subsystem only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationManagerConfig {
    pub id: String,
    pub board_id: String,
    pub level: i32,
    pub manager_user_id: String,
    pub notify_channels: Vec<NotificationChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationChannel::InApp => write!(f, "in_app"),
            NotificationChannel::Email => write!(f, "email"),
        }
    }
}
