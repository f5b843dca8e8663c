use serde::{Deserialize, Serialize};

/// Minimal user summary, enough to address a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}
