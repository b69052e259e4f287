//! Outcome contracts for the two pipeline stages.
//!
//! Each stage yields exactly one of two shapes: a success payload or a
//! domain-level failure the caller is expected to branch on. Both are
//! modeled as exhaustive enums so an error path cannot be read as a success
//! by omission.

use serde::{Deserialize, Serialize};

/// One ranked resource-type candidate from the selection stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedType {
    /// Must be a member of the bound metadata's `resource_types`
    pub selected_type: String,
    /// In [0.0, 1.0]
    pub confidence: f64,
    pub reasoning: String,
}

/// Terminal "no plausible resource type" outcome.
///
/// Distinct from a low-confidence candidate list: the server simply does not
/// expose anything that could satisfy the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTypeError {
    pub error: String,
    pub reasoning: String,
}

/// Result of a selection call: a non-empty ranked candidate list, most
/// confident first, or a domain failure. Never both, never neither.
#[derive(Debug, Clone)]
pub enum TypeSelection {
    Selected(Vec<SelectedType>),
    Failed(SelectTypeError),
}

impl TypeSelection {
    /// The most confident candidate, if selection succeeded
    pub fn top(&self) -> Option<&SelectedType> {
        match self {
            TypeSelection::Selected(candidates) => candidates.first(),
            TypeSelection::Failed(_) => None,
        }
    }
}

/// Validated output of the construction stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// `key=value&...`, percent-encoded, no leading `?`
    pub query_string: String,
    /// Decoded pairs recovered from `query_string`, for inspection.
    /// Repeated keys appear as separate entries.
    pub parameters: Vec<(String, String)>,
}

/// Domain failure of the construction stage: the request cannot be satisfied
/// with the parameters this server supports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueryError {
    pub error: String,
    /// Guidance toward a query the server could answer
    pub suggestion: Option<String>,
}

/// Result of a construction call, same mutual-exclusivity discipline as
/// [`TypeSelection`]
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Query(QueryResult),
    Failed(CreateQueryError),
}
