use crate::domain::entities::{Ticket, TicketResource, TicketSla};
use crate::domain::errors::SlaResult;

/// Access to the ticket row and its SLA fields.
///
/// Every SLA mutation is a read-modify-write of the ticket's `sla` block and
/// must happen inside one transaction; callers are required to serialize
/// operations per ticket (no optimistic locking on these fields).
#[async_trait::async_trait]
pub trait TicketRepository: Send + Sync {
    async fn get_ticket(&self, ticket_id: &str) -> SlaResult<Option<Ticket>>;
    async fn update_ticket_sla(&self, ticket_id: &str, sla: &TicketSla) -> SlaResult<()>;

    async fn get_resources(&self, ticket_id: &str) -> SlaResult<Vec<TicketResource>>;
    async fn add_resource(&self, resource: &TicketResource) -> SlaResult<()>;
    async fn update_resource_role(&self, resource_id: &str, role: &str) -> SlaResult<()>;
}
