pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::api::{AppState, SharedState, app};
pub use crate::config::Config;
pub use crate::core::errors::FreewiseError;
pub use crate::core::services::FreewiseService;
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // Include integration tests
