pub mod audit;
pub mod escalation;
pub mod policy;
pub mod schedule;
pub mod settings;
pub mod ticket;
pub mod user;

pub use audit::*;
pub use escalation::*;
pub use policy::*;
pub use schedule::*;
pub use settings::*;
pub use ticket::*;
pub use user::*;
