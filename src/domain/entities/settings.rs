use serde::{Deserialize, Serialize};

/// Per-tenant SLA behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaSettings {
    pub tenant_id: String,
    /// When true, a ticket in `awaiting_client` response state pauses the
    /// SLA clock.
    pub pause_on_awaiting_client: bool,
}

impl SlaSettings {
    pub fn defaults(tenant_id: String) -> Self {
        Self {
            tenant_id,
            pause_on_awaiting_client: false,
        }
    }
}
