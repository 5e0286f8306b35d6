pub mod config;
pub mod error;
pub mod core {
    pub mod handlers;
    pub mod types;
}
pub mod ai {
    pub mod client;
    pub mod prompts;
    pub mod schema_utils;
}
pub mod orchestrator;

pub use ai::schema_utils::{validate_schema, Issue};
pub use error::ChainError;
