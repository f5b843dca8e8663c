pub mod clock;
pub mod notification_sender;
pub mod sla_backend;
pub mod sla_repository;
pub mod ticket_repository;
pub mod user_repository;

pub use clock::{Clock, SystemClock};
pub use notification_sender::NotificationSender;
pub use sla_backend::{SlaBackend, SlaKind};
pub use sla_repository::SlaRepository;
pub use ticket_repository::TicketRepository;
pub use user_repository::UserRepository;
