//! In-memory implementations of the domain ports, with recording doubles for
//! the notification and backend side channels and a manually driven clock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use slatrack::domain::entities::*;
use slatrack::domain::errors::{SlaError, SlaResult};
use slatrack::domain::ports::{
    Clock, NotificationSender, SlaBackend, SlaKind, SlaRepository, TicketRepository,
    UserRepository,
};

#[derive(Default)]
struct SlaRepoState {
    policies: Vec<SlaPolicy>,
    targets: Vec<SlaPolicyTarget>,
    schedules: Vec<BusinessHoursSchedule>,
    client_policies: HashMap<String, String>,
    board_policies: HashMap<String, String>,
    settings: HashMap<String, SlaSettings>,
    pausing_statuses: HashSet<String>,
    escalation_managers: Vec<EscalationManagerConfig>,
    audits: Vec<SlaAuditLog>,
    pause_history: Vec<SlaPauseHistory>,
}

pub struct MemorySlaRepository {
    state: Mutex<SlaRepoState>,
    pub fail_audit: AtomicBool,
}

impl MemorySlaRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlaRepoState::default()),
            fail_audit: AtomicBool::new(false),
        }
    }

    pub fn add_policy(&self, policy: SlaPolicy) {
        self.state.lock().unwrap().policies.push(policy);
    }

    pub fn add_target(&self, target: SlaPolicyTarget) {
        self.state.lock().unwrap().targets.push(target);
    }

    pub fn add_schedule(&self, schedule: BusinessHoursSchedule) {
        self.state.lock().unwrap().schedules.push(schedule);
    }

    pub fn assign_client_policy(&self, client_id: &str, policy_id: &str) {
        self.state
            .lock()
            .unwrap()
            .client_policies
            .insert(client_id.to_string(), policy_id.to_string());
    }

    pub fn assign_board_policy(&self, board_id: &str, policy_id: &str) {
        self.state
            .lock()
            .unwrap()
            .board_policies
            .insert(board_id.to_string(), policy_id.to_string());
    }

    pub fn set_settings(&self, settings: SlaSettings) {
        self.state
            .lock()
            .unwrap()
            .settings
            .insert(settings.tenant_id.clone(), settings);
    }

    pub fn add_pausing_status(&self, status_id: &str) {
        self.state
            .lock()
            .unwrap()
            .pausing_statuses
            .insert(status_id.to_string());
    }

    pub fn add_escalation_manager(&self, config: EscalationManagerConfig) {
        self.state.lock().unwrap().escalation_managers.push(config);
    }

    pub fn audits(&self) -> Vec<SlaAuditLog> {
        self.state.lock().unwrap().audits.clone()
    }

    pub fn audits_for_event(&self, event: SlaAuditEvent) -> Vec<SlaAuditLog> {
        self.audits()
            .into_iter()
            .filter(|a| a.event == event)
            .collect()
    }

    pub fn pause_history(&self) -> Vec<SlaPauseHistory> {
        self.state.lock().unwrap().pause_history.clone()
    }

    pub fn policies(&self) -> Vec<SlaPolicy> {
        self.state.lock().unwrap().policies.clone()
    }

    pub fn targets_for(&self, policy_id: &str) -> Vec<SlaPolicyTarget> {
        self.state
            .lock()
            .unwrap()
            .targets
            .iter()
            .filter(|t| t.policy_id == policy_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SlaRepository for MemorySlaRepository {
    async fn create_policy(&self, policy: &SlaPolicy) -> SlaResult<()> {
        self.state.lock().unwrap().policies.push(policy.clone());
        Ok(())
    }

    async fn get_policy(&self, policy_id: &str) -> SlaResult<Option<SlaPolicy>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .policies
            .iter()
            .find(|p| p.id == policy_id)
            .cloned())
    }

    async fn get_policy_by_name(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> SlaResult<Option<SlaPolicy>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .policies
            .iter()
            .find(|p| p.tenant_id == tenant_id && p.name == name)
            .cloned())
    }

    async fn get_policy_for_client(&self, client_id: &str) -> SlaResult<Option<SlaPolicy>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .client_policies
            .get(client_id)
            .and_then(|policy_id| state.policies.iter().find(|p| &p.id == policy_id))
            .cloned())
    }

    async fn get_policy_for_board(&self, board_id: &str) -> SlaResult<Option<SlaPolicy>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .board_policies
            .get(board_id)
            .and_then(|policy_id| state.policies.iter().find(|p| &p.id == policy_id))
            .cloned())
    }

    async fn get_default_policy(&self, tenant_id: &str) -> SlaResult<Option<SlaPolicy>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .policies
            .iter()
            .find(|p| p.tenant_id == tenant_id && p.is_default)
            .cloned())
    }

    async fn create_target(&self, target: &SlaPolicyTarget) -> SlaResult<()> {
        self.state.lock().unwrap().targets.push(target.clone());
        Ok(())
    }

    async fn get_target(
        &self,
        policy_id: &str,
        priority_id: &str,
    ) -> SlaResult<Option<SlaPolicyTarget>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .targets
            .iter()
            .find(|t| t.policy_id == policy_id && t.priority_id == priority_id)
            .cloned())
    }

    async fn list_targets(&self, policy_id: &str) -> SlaResult<Vec<SlaPolicyTarget>> {
        Ok(self.targets_for(policy_id))
    }

    async fn get_schedule(&self, schedule_id: &str) -> SlaResult<Option<BusinessHoursSchedule>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned())
    }

    async fn get_default_schedule(
        &self,
        tenant_id: &str,
    ) -> SlaResult<Option<BusinessHoursSchedule>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .schedules
            .iter()
            .find(|s| s.tenant_id == tenant_id && s.is_default)
            .cloned())
    }

    async fn get_settings(&self, tenant_id: &str) -> SlaResult<SlaSettings> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .settings
            .get(tenant_id)
            .cloned()
            .unwrap_or_else(|| SlaSettings::defaults(tenant_id.to_string())))
    }

    async fn status_pauses_sla(&self, status_id: &str) -> SlaResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pausing_statuses
            .contains(status_id))
    }

    async fn get_escalation_manager(
        &self,
        board_id: &str,
        level: i32,
    ) -> SlaResult<Option<EscalationManagerConfig>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .escalation_managers
            .iter()
            .find(|m| m.board_id == board_id && m.level == level)
            .cloned())
    }

    async fn append_audit(&self, entry: &SlaAuditLog) -> SlaResult<()> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(SlaError::Repository("audit table unavailable".to_string()));
        }
        self.state.lock().unwrap().audits.push(entry.clone());
        Ok(())
    }

    async fn append_pause_history(&self, entry: &SlaPauseHistory) -> SlaResult<()> {
        self.state
            .lock()
            .unwrap()
            .pause_history
            .push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
struct TicketRepoState {
    tickets: HashMap<String, Ticket>,
    resources: Vec<TicketResource>,
}

pub struct MemoryTicketRepository {
    state: Mutex<TicketRepoState>,
    pub fail_resources: AtomicBool,
}

impl MemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TicketRepoState::default()),
            fail_resources: AtomicBool::new(false),
        }
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        self.state
            .lock()
            .unwrap()
            .tickets
            .insert(ticket.id.clone(), ticket);
    }

    pub fn ticket(&self, ticket_id: &str) -> Ticket {
        self.state
            .lock()
            .unwrap()
            .tickets
            .get(ticket_id)
            .cloned()
            .expect("ticket present")
    }

    pub fn resources(&self, ticket_id: &str) -> Vec<TicketResource> {
        self.state
            .lock()
            .unwrap()
            .resources
            .iter()
            .filter(|r| r.ticket_id == ticket_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn get_ticket(&self, ticket_id: &str) -> SlaResult<Option<Ticket>> {
        Ok(self.state.lock().unwrap().tickets.get(ticket_id).cloned())
    }

    async fn update_ticket_sla(&self, ticket_id: &str, sla: &TicketSla) -> SlaResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.tickets.get_mut(ticket_id) {
            Some(ticket) => {
                ticket.sla = sla.clone();
                Ok(())
            }
            None => Err(SlaError::NotFound(format!(
                "Ticket not found: {}",
                ticket_id
            ))),
        }
    }

    async fn get_resources(&self, ticket_id: &str) -> SlaResult<Vec<TicketResource>> {
        if self.fail_resources.load(Ordering::SeqCst) {
            return Err(SlaError::Repository("resources unavailable".to_string()));
        }
        Ok(self.resources(ticket_id))
    }

    async fn add_resource(&self, resource: &TicketResource) -> SlaResult<()> {
        if self.fail_resources.load(Ordering::SeqCst) {
            return Err(SlaError::Repository("resources unavailable".to_string()));
        }
        self.state.lock().unwrap().resources.push(resource.clone());
        Ok(())
    }

    async fn update_resource_role(&self, resource_id: &str, role: &str) -> SlaResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.resources.iter_mut().find(|r| r.id == resource_id) {
            Some(resource) => {
                resource.role = role.to_string();
                Ok(())
            }
            None => Err(SlaError::NotFound(format!(
                "Resource not found: {}",
                resource_id
            ))),
        }
    }
}

pub struct MemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_user(&self, user_id: &str) -> SlaResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub channel: String,
    pub user_id: String,
    pub subject: String,
    pub data: serde_json::Value,
}

pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    pub fail_in_app: AtomicBool,
    pub fail_email: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_in_app: AtomicBool::new(false),
            fail_email: AtomicBool::new(false),
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_on(&self, channel: &str) -> Vec<SentNotification> {
        self.sent()
            .into_iter()
            .filter(|n| n.channel == channel)
            .collect()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_in_app(
        &self,
        user_id: &str,
        title: &str,
        _message: &str,
        metadata: serde_json::Value,
    ) -> SlaResult<()> {
        if self.fail_in_app.load(Ordering::SeqCst) {
            return Err(SlaError::Notification("in-app channel down".to_string()));
        }
        self.sent.lock().unwrap().push(SentNotification {
            channel: "in_app".to_string(),
            user_id: user_id.to_string(),
            subject: title.to_string(),
            data: metadata,
        });
        Ok(())
    }

    async fn send_email(
        &self,
        user_id: &str,
        _email: &str,
        template_name: &str,
        template_data: serde_json::Value,
    ) -> SlaResult<()> {
        if self.fail_email.load(Ordering::SeqCst) {
            return Err(SlaError::Notification("smtp unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(SentNotification {
            channel: "email".to_string(),
            user_id: user_id.to_string(),
            subject: template_name.to_string(),
            data: template_data,
        });
        Ok(())
    }
}

pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    pub fail_all: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_all: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> SlaResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(SlaError::Backend("backend unavailable".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl SlaBackend for RecordingBackend {
    async fn start_sla_tracking(
        &self,
        ticket_id: &str,
        _response_due_at: Option<DateTime<Utc>>,
        _resolution_due_at: Option<DateTime<Utc>>,
    ) -> SlaResult<()> {
        self.record(format!("start:{}", ticket_id))
    }

    async fn pause_sla(&self, ticket_id: &str) -> SlaResult<()> {
        self.record(format!("pause:{}", ticket_id))
    }

    async fn resume_sla(&self, ticket_id: &str) -> SlaResult<()> {
        self.record(format!("resume:{}", ticket_id))
    }

    async fn complete_sla(&self, ticket_id: &str, kind: SlaKind, met: bool) -> SlaResult<()> {
        self.record(format!("complete:{}:{}:{}", ticket_id, kind, met))
    }

    async fn cancel_sla(&self, ticket_id: &str) -> SlaResult<()> {
        self.record(format!("cancel:{}", ticket_id))
    }

    async fn get_sla_status(&self, _ticket_id: &str) -> SlaResult<Option<serde_json::Value>> {
        Ok(None)
    }
}

/// Clock that only moves when the test says so.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn at_str(rfc3339: &str) -> Self {
        Self::at(
            DateTime::parse_from_rfc3339(rfc3339)
                .expect("valid timestamp")
                .with_timezone(&Utc),
        )
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
