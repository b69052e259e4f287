//! Common FHIR search parameters every server understands.
//!
//! These apply to all resource types, so they double as the universal set
//! that is always legal in a generated query, on top of whatever the server
//! declares per type.

use once_cell::sync::Lazy;

use crate::metadata::SearchParameter;

fn param(name: &str, param_type: &str, documentation: &str) -> SearchParameter {
    SearchParameter {
        name: name.to_string(),
        param_type: Some(param_type.to_string()),
        documentation: Some(documentation.to_string()),
    }
}

static COMMON_SEARCH_PARAMS: Lazy<Vec<SearchParameter>> = Lazy::new(|| {
    vec![
        param(
            "_id",
            "token",
            "The logical id of the resource (e.g., _id=123)",
        ),
        param(
            "_lastUpdated",
            "date",
            "When the resource was last changed (e.g., _lastUpdated=gt2023-01-01)",
        ),
        param(
            "_tag",
            "token",
            "Tags applied to this resource in Resource.meta.tag",
        ),
        param(
            "_profile",
            "reference",
            "Profiles this resource claims to conform to in Resource.meta.profile",
        ),
        param(
            "_security",
            "token",
            "Security labels applied to this resource in Resource.meta.security",
        ),
        param(
            "_source",
            "uri",
            "Identifies the source system in Resource.meta.source",
        ),
        param("_language", "token", "Language of the resource content"),
        param(
            "_text",
            "string",
            "Search on the narrative text of the resource (special)",
        ),
        param(
            "_content",
            "string",
            "Search on the entire content of the resource (special)",
        ),
        param(
            "_list",
            "special",
            "Search resources referenced by a List resource",
        ),
        param(
            "_has",
            "special",
            "Reverse chaining - select resources based on properties of resources that refer \
             to them. Examples: GET /Patient?_has:Observation:patient:code=1234-5 (Patients who \
             have an Observation with code 1234-5), GET \
             /Practitioner?_has:MedicationRequest:requester:_id=* (Practitioners who have \
             authored any MedicationRequest)",
        ),
        param(
            "_type",
            "special",
            "Filter by resource type (used in system-level searches)",
        ),
        param(
            "_in",
            "reference",
            "Test membership in CareTeam, Group, or List",
        ),
        param(
            "_filter",
            "special",
            "Advanced filter expression (FHIRPath-like syntax)",
        ),
        param("_query", "special", "Invoke a named/custom query operation"),
        param(
            "_sort",
            "string",
            "Comma-separated list of sort rules. Prefix with - for descending order. \
             Example: _sort=-date,status",
        ),
        param(
            "_count",
            "number",
            "Number of results per page. Example: _count=10",
        ),
        param(
            "_include",
            "special",
            "Include referenced resources in results. Syntax: _include=[Resource]:[searchParam] \
             or [Resource]:[searchParam]:[targetType] or *. Example: _include=Observation:patient",
        ),
        param(
            "_revinclude",
            "special",
            "Include resources that reference the matches (reverse include). Syntax: \
             _revinclude=[Resource]:[searchParam] or [Resource]:[searchParam]:[targetType] or *. \
             Example: _revinclude=Provenance:target",
        ),
        param(
            "_summary",
            "code",
            "Return summary view: true, false, text, count, data",
        ),
        param(
            "_elements",
            "string",
            "Comma-separated list of elements to return. Example: _elements=identifier,name,birthDate",
        ),
        param(
            "_contained",
            "code",
            "How to handle contained resources: true, false, both",
        ),
        param(
            "_containedType",
            "code",
            "What to return when contained matches: container, contained",
        ),
        param(
            "_total",
            "code",
            "Request total count precision: none, estimate, accurate",
        ),
        param(
            "_maxresults",
            "number",
            "Maximum total results to return across all pages",
        ),
        param(
            "_score",
            "boolean",
            "Whether to include relevance scores (true/false)",
        ),
        param(
            "_graph",
            "reference",
            "Reference to a GraphDefinition for structured includes",
        ),
    ]
});

/// The shared read-only table of well-known search parameters
pub fn common_search_params() -> &'static [SearchParameter] {
    &COMMON_SEARCH_PARAMS
}

/// Whether `name` is one of the universal parameters
pub fn is_common_param(name: &str) -> bool {
    COMMON_SEARCH_PARAMS.iter().any(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_universal_modifiers() {
        for name in ["_id", "_lastUpdated", "_sort", "_count", "_include", "_revinclude"] {
            assert!(is_common_param(name), "missing {}", name);
        }
        assert!(!is_common_param("gender"));
    }

    #[test]
    fn every_entry_is_documented() {
        for p in common_search_params() {
            assert!(p.name.starts_with('_'), "{} is not an underscore param", p.name);
            assert!(p.param_type.is_some());
            assert!(p.documentation.as_deref().is_some_and(|d| !d.is_empty()));
        }
    }
}
