//! fquery-agents: AI-backed FHIR query building pipeline
//!
//! Discovers a FHIR server's searchable surface from its capability
//! statement, then drives two Claude-backed stages over it: resource-type
//! selection and search-query construction. [`QuerySession`] is the
//! high-level entry point; the individual pieces are public for callers
//! that want to drive the stages themselves.

pub mod backend;
pub mod client;
pub mod config;
pub mod fetch;
mod prompts;
pub mod query;
pub mod select;
pub mod session;

pub use backend::{GenerationBackend, ToolInvocation};
pub use client::{ClaudeClient, Tool};
pub use config::Config;
pub use fetch::fetch_searchable_resources;
pub use query::CreateQueryAgent;
pub use select::SelectTypesAgent;
pub use session::QuerySession;
