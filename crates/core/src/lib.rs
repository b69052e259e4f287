//! fquery-core: shared data model for the natural-language FHIR query builder
//!
//! This crate provides the I/O-free half of the pipeline: the capability
//! statement model, the searchable-server metadata snapshot, the common
//! search parameter table, query string helpers, and the outcome contracts
//! shared by the selection and construction stages.

pub mod capability;
pub mod error;
pub mod metadata;
pub mod outcome;
pub mod params;
pub mod search;

// Re-export the types callers touch directly
pub use capability::CapabilityStatement;
pub use error::PipelineError;
pub use metadata::{ResourceMetadata, SearchParameter, ServerMetadata};
pub use outcome::{
    CreateQueryError, QueryOutcome, QueryResult, SelectTypeError, SelectedType, TypeSelection,
};
pub use params::common_search_params;
