pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use config::*;
pub use domain::*;
pub use infrastructure::*;
pub use services::*;
