use std::sync::Arc;

use tracing::{error, info};

use crate::domain::entities::{SlaPolicy, SlaPolicyTarget};
use crate::domain::errors::SlaResult;
use crate::domain::ports::SlaRepository;
use crate::services::SlaOutcome;

/// Name under which the provisioned policy is stored; doubles as the
/// idempotency key.
pub const ITIL_POLICY_NAME: &str = "ITIL Priority Matrix";

/// Maps a tenant's priority id onto an ITIL level (1 = critical, 4 = low).
#[derive(Debug, Clone)]
pub struct ItilPriorityMapping {
    pub priority_id: String,
    pub level: u8,
}

/// ITIL level → (response minutes, resolution minutes, thresholds, 24x7).
/// Critical incidents run around the clock; everything else follows the
/// tenant's business hours.
fn itil_target_matrix(level: u8) -> Option<(i64, i64, (f64, f64, f64), bool)> {
    match level {
        1 => Some((60, 240, (50.0, 75.0, 90.0), true)),
        2 => Some((120, 480, (50.0, 75.0, 90.0), false)),
        3 => Some((240, 1440, (60.0, 80.0, 95.0), false)),
        4 => Some((480, 4320, (60.0, 80.0, 95.0), false)),
        _ => None,
    }
}

/// One-shot provisioning of an ITIL-style SLA policy with a standard
/// priority matrix.
#[derive(Clone)]
pub struct ItilAutoConfigService {
    sla_repo: Arc<dyn SlaRepository>,
}

impl ItilAutoConfigService {
    pub fn new(sla_repo: Arc<dyn SlaRepository>) -> Self {
        Self { sla_repo }
    }

    /// Create the ITIL policy and one target per mapped priority. Idempotent:
    /// if the tenant already has a policy named [`ITIL_POLICY_NAME`], nothing
    /// is created. Mappings with an unknown level are skipped.
    pub async fn provision_itil_policy(
        &self,
        tenant_id: &str,
        mappings: &[ItilPriorityMapping],
    ) -> SlaOutcome {
        match self.try_provision(tenant_id, mappings).await {
            Ok(true) => SlaOutcome::changed(),
            Ok(false) => SlaOutcome::unchanged(),
            Err(e) => {
                error!(tenant_id, error = %e, "ITIL policy provisioning failed");
                SlaOutcome::failed(e)
            }
        }
    }

    async fn try_provision(
        &self,
        tenant_id: &str,
        mappings: &[ItilPriorityMapping],
    ) -> SlaResult<bool> {
        if let Some(existing) = self
            .sla_repo
            .get_policy_by_name(tenant_id, ITIL_POLICY_NAME)
            .await?
        {
            info!(tenant_id, policy_id = %existing.id, "ITIL policy already provisioned");
            return Ok(false);
        }

        let policy = SlaPolicy::new(
            tenant_id.to_string(),
            ITIL_POLICY_NAME.to_string(),
            Some("Auto-configured ITIL priority matrix".to_string()),
        );
        self.sla_repo.create_policy(&policy).await?;

        let mut created = 0usize;
        for mapping in mappings {
            let (response, resolution, (t1, t2, t3), is_24x7) =
                match itil_target_matrix(mapping.level) {
                    Some(row) => row,
                    None => {
                        info!(
                            tenant_id,
                            priority_id = %mapping.priority_id,
                            level = mapping.level,
                            "Skipping mapping with unknown ITIL level"
                        );
                        continue;
                    }
                };
            let mut target =
                SlaPolicyTarget::new(policy.id.clone(), mapping.priority_id.clone());
            target.response_minutes = Some(response);
            target.resolution_minutes = Some(resolution);
            target.escalation_threshold_1 = Some(t1);
            target.escalation_threshold_2 = Some(t2);
            target.escalation_threshold_3 = Some(t3);
            target.is_24x7 = is_24x7;
            self.sla_repo.create_target(&target).await?;
            created += 1;
        }

        info!(tenant_id, policy_id = %policy.id, targets = created, "ITIL policy provisioned");
        Ok(true)
    }
}
