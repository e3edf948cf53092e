pub mod config;
pub mod errors;
pub mod firm_rules_service;
pub mod project_config;
pub mod response_formatter;
pub mod rules;
pub mod tool_router;

// Re-export commonly used types
pub use rules::types::*;
