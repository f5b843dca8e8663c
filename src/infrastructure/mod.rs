pub mod backend;

pub use backend::{resolve_sla_backend, DatabaseSlaBackend};
