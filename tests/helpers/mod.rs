// Shared test support: in-memory port implementations and entity builders.
// Not every test binary uses every helper.
#![allow(dead_code)]

pub mod memory;

pub use memory::*;

use std::sync::{Arc, Once};

use chrono::Weekday;
use slatrack::domain::entities::*;
use slatrack::services::{EscalationService, SlaLifecycleService, SlaPauseService};

pub const TENANT: &str = "tenant-1";
pub const BASE_URL: &str = "http://localhost:3000";

static TRACING: Once = Once::new();

/// Service logs for failing tests; filter with RUST_LOG.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Mon-Fri 09:00-17:00 UTC.
pub fn weekday_schedule() -> BusinessHoursSchedule {
    let mut schedule = BusinessHoursSchedule::new(
        TENANT.to_string(),
        "Standard Business Hours".to_string(),
        "UTC".to_string(),
    );
    for day in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ] {
        schedule.entries.push(BusinessHoursEntry::new(
            schedule.id.clone(),
            day,
            "09:00",
            "17:00",
        ));
    }
    schedule
}

/// Every day 09:00-17:00 in the given zone; used for DST tests.
pub fn daily_schedule(timezone: &str) -> BusinessHoursSchedule {
    let mut schedule = BusinessHoursSchedule::new(
        TENANT.to_string(),
        "Daily".to_string(),
        timezone.to_string(),
    );
    for day in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        schedule.entries.push(BusinessHoursEntry::new(
            schedule.id.clone(),
            day,
            "09:00",
            "17:00",
        ));
    }
    schedule
}

pub fn make_ticket(id: &str, priority_id: Option<&str>) -> Ticket {
    Ticket {
        id: id.to_string(),
        tenant_id: TENANT.to_string(),
        ticket_number: 1001,
        title: "Printer on fire".to_string(),
        board_id: Some("board-1".to_string()),
        client_id: None,
        priority_id: priority_id.map(str::to_string),
        status_id: Some("status-open".to_string()),
        response_state: ResponseState::AwaitingAgent,
        assigned_to: None,
        sla: TicketSla::default(),
    }
}

pub fn default_policy() -> SlaPolicy {
    let mut policy = SlaPolicy::new(TENANT.to_string(), "Default SLA".to_string(), None);
    policy.is_default = true;
    policy
}

/// A default policy with one 24x7 target for the given priority.
pub fn policy_with_24x7_target(
    priority_id: &str,
    response_minutes: i64,
    resolution_minutes: i64,
) -> (SlaPolicy, SlaPolicyTarget) {
    let policy = default_policy();
    let mut target = SlaPolicyTarget::new(policy.id.clone(), priority_id.to_string());
    target.response_minutes = Some(response_minutes);
    target.resolution_minutes = Some(resolution_minutes);
    target.is_24x7 = true;
    (policy, target)
}

/// Everything a service test needs, wired against the in-memory ports.
pub struct TestEnv {
    pub sla_repo: Arc<MemorySlaRepository>,
    pub tickets: Arc<MemoryTicketRepository>,
    pub users: Arc<MemoryUserRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub backend: Arc<RecordingBackend>,
    pub clock: Arc<ManualClock>,
}

impl TestEnv {
    pub fn new() -> Self {
        init_tracing();
        Self {
            sla_repo: Arc::new(MemorySlaRepository::new()),
            tickets: Arc::new(MemoryTicketRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            backend: Arc::new(RecordingBackend::new()),
            clock: Arc::new(ManualClock::at_str("2025-01-06T10:00:00Z")),
        }
    }

    pub fn lifecycle(&self) -> SlaLifecycleService {
        SlaLifecycleService::new(
            self.sla_repo.clone(),
            self.tickets.clone(),
            self.backend.clone(),
            self.clock.clone(),
        )
    }

    pub fn pause(&self) -> SlaPauseService {
        SlaPauseService::new(
            self.tickets.clone(),
            self.sla_repo.clone(),
            self.backend.clone(),
            self.clock.clone(),
        )
    }

    pub fn escalation(&self) -> EscalationService {
        EscalationService::new(
            self.sla_repo.clone(),
            self.tickets.clone(),
            self.users.clone(),
            self.notifier.clone(),
            self.clock.clone(),
            BASE_URL.to_string(),
        )
    }
}
