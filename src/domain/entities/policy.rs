use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant-scoped SLA policy. At most one policy per tenant carries
/// `is_default = true`; the store enforces that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub business_hours_schedule_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SlaPolicy {
    pub fn new(tenant_id: String, name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            name,
            description,
            is_default: false,
            business_hours_schedule_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-priority response/resolution goals within a policy.
///
/// `None` minutes mean "no target" for that milestone. Thresholds are
/// percentages of elapsed time; values over 100 represent post-breach tiers.
/// They are conventionally ascending but stored as provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicyTarget {
    pub id: String,
    pub policy_id: String,
    pub priority_id: String,
    pub response_minutes: Option<i64>,
    pub resolution_minutes: Option<i64>,
    pub escalation_threshold_1: Option<f64>,
    pub escalation_threshold_2: Option<f64>,
    pub escalation_threshold_3: Option<f64>,
    /// Bypasses the business-hours schedule entirely for this priority.
    pub is_24x7: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SlaPolicyTarget {
    pub fn new(policy_id: String, priority_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            policy_id,
            priority_id,
            response_minutes: None,
            resolution_minutes: None,
            escalation_threshold_1: None,
            escalation_threshold_2: None,
            escalation_threshold_3: None,
            is_24x7: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Threshold for a given escalation level (1..=3), if configured.
    pub fn threshold_for_level(&self, level: i32) -> Option<f64> {
        match level {
            1 => self.escalation_threshold_1,
            2 => self.escalation_threshold_2,
            3 => self.escalation_threshold_3,
            _ => None,
        }
    }
}
