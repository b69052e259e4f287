//! Search-query construction stage

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;

use fquery_core::{
    CreateQueryError, PipelineError, QueryOutcome, QueryResult, ResourceMetadata, SearchParameter,
    ServerMetadata, common_search_params, search,
};

use crate::backend::GenerationBackend;
use crate::client::Tool;
use crate::prompts::SYNTAX_SUMMARY;

pub(crate) const SUBMIT_TOOL: &str = "submit_query";
pub(crate) const REJECT_TOOL: &str = "reject_query";

/// Agent that builds a validated FHIR search query for one resource type.
///
/// Bound at construction time to one target type and one [`ServerMetadata`]
/// snapshot. Construction fails fast with `InvalidArgument` when the target
/// type is not advertised by the server; that is a caller bug, not a
/// runtime path.
pub struct CreateQueryAgent {
    target_type: String,
    metadata: Arc<ServerMetadata>,
    backend: Arc<dyn GenerationBackend>,
    system_prompt: String,
    allowed_params: BTreeSet<String>,
}

impl std::fmt::Debug for CreateQueryAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateQueryAgent")
            .field("target_type", &self.target_type)
            .field("allowed_params", &self.allowed_params)
            .finish_non_exhaustive()
    }
}

impl CreateQueryAgent {
    pub fn new(
        target_type: &str,
        metadata: Arc<ServerMetadata>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self, PipelineError> {
        let resource = metadata.require_resource(target_type)?;
        let system_prompt = build_system_prompt(resource);
        let allowed_params = metadata.allowed_param_names(target_type)?;

        Ok(Self {
            target_type: target_type.to_string(),
            metadata,
            backend,
            system_prompt,
            allowed_params,
        })
    }

    /// Build a search query string for the bound type from free text.
    ///
    /// Returns [`QueryOutcome::Failed`] when the request cannot be satisfied
    /// with the parameters this server supports, including the case where
    /// the model emitted an unsupported parameter: generated output is
    /// validated here and never surfaced unchecked.
    pub async fn build_query(&self, query: &str) -> Result<QueryOutcome, PipelineError> {
        tracing::info!(resource_type = %self.target_type, query, "Building search query");

        let tools = construction_tools();
        let invocation = self
            .backend
            .generate(&self.system_prompt, query, &tools)
            .await?;

        match invocation.name.as_str() {
            SUBMIT_TOOL => {
                let raw = invocation
                    .input
                    .get("query_string")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        PipelineError::ConstraintViolation(
                            "submit_query payload missing 'query_string'".to_string(),
                        )
                    })?;
                Ok(self.validate(raw))
            }
            REJECT_TOOL => {
                let failure: CreateQueryError =
                    serde_json::from_value(invocation.input).map_err(|e| {
                        PipelineError::ConstraintViolation(format!(
                            "malformed rejection payload: {}",
                            e
                        ))
                    })?;
                tracing::info!(resource_type = %self.target_type, error = %failure.error, "Query construction rejected");
                Ok(QueryOutcome::Failed(failure))
            }
            other => Err(PipelineError::ConstraintViolation(format!(
                "unexpected tool '{}' from construction backend",
                other
            ))),
        }
    }

    /// Check a generated query string against the allowed parameter set.
    ///
    /// A violation is converted into a domain failure with a suggestion,
    /// rather than letting invalid output reach the caller as success.
    fn validate(&self, raw: &str) -> QueryOutcome {
        let query_string = raw.trim().trim_start_matches('?').to_string();

        let parameters = match search::parse_query_string(&query_string) {
            Ok(parameters) => parameters,
            Err(detail) => {
                tracing::warn!(resource_type = %self.target_type, %query_string, %detail, "Generated query string is malformed");
                return QueryOutcome::Failed(CreateQueryError {
                    error: format!("generated query string is malformed: {}", detail),
                    suggestion: Some(self.supported_params_hint()),
                });
            }
        };

        let unsupported: Vec<&str> = parameters
            .iter()
            .map(|(key, _)| search::base_param_name(key))
            .filter(|base| !self.allowed_params.contains(*base))
            .collect();

        if !unsupported.is_empty() {
            tracing::warn!(
                resource_type = %self.target_type,
                %query_string,
                unsupported = %unsupported.join(", "),
                "Generated query used unsupported parameters"
            );
            return QueryOutcome::Failed(CreateQueryError {
                error: format!(
                    "generated query used parameter(s) not supported for {}: {}",
                    self.target_type,
                    unsupported.join(", ")
                ),
                suggestion: Some(self.supported_params_hint()),
            });
        }

        tracing::info!(resource_type = %self.target_type, %query_string, "Search query validated");
        QueryOutcome::Query(QueryResult {
            query_string,
            parameters,
        })
    }

    fn supported_params_hint(&self) -> String {
        let names: Vec<&str> = self
            .metadata
            .resource(&self.target_type)
            .map(|resource| {
                resource
                    .search_params
                    .iter()
                    .map(|p| p.name.as_str())
                    .take(12)
                    .collect()
            })
            .unwrap_or_default();
        format!(
            "Supported search parameters for {} include: {}",
            self.target_type,
            names.join(", ")
        )
    }
}

fn construction_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: SUBMIT_TOOL.to_string(),
            description: "Submit the finished FHIR search query string".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query_string": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The query string to append to the resource endpoint, e.g. name=John&birthdate=gt1990-01-01"
                    }
                },
                "required": ["query_string"],
                "additionalProperties": false
            }),
        },
        Tool {
            name: REJECT_TOOL.to_string(),
            description: "Report that no valid query can be built for this request".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "error": {
                        "type": "string",
                        "description": "What prevented building a valid query"
                    },
                    "suggestion": {
                        "type": "string",
                        "description": "Alternative approaches or corrections the user could try"
                    }
                },
                "required": ["error"],
                "additionalProperties": false
            }),
        },
    ]
}

/// Merge the server's parameters for this type with the universal table
/// (server declarations shadow same-named common entries) and render the
/// construction prompt.
fn build_system_prompt(resource: &ResourceMetadata) -> String {
    let declared: BTreeSet<&str> = resource
        .search_params
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    let mut available: Vec<&SearchParameter> = resource.search_params.iter().collect();
    available.extend(
        common_search_params()
            .iter()
            .filter(|p| !declared.contains(p.name.as_str())),
    );
    available.sort_by(|a, b| a.name.cmp(&b.name));

    let params_list = available
        .iter()
        .map(|p| format!("  - {}", p))
        .collect::<Vec<_>>()
        .join("\n");
    let includes_list = resource
        .include_values
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n");
    let revincludes_list = resource
        .revinclude_values
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a FHIR query builder. Build a valid FHIR search query string for the '{target}' resource type.

TARGET RESOURCE TYPE: {target}

AVAILABLE SEARCH PARAMETERS ({param_count} total):
{params_list}

AVAILABLE _include VALUES ({include_count} total):
{includes_list}

AVAILABLE _revinclude VALUES ({revinclude_count} total):
{revincludes_list}

{syntax}

Your task:
1. Analyze the user's query to understand what data they want to search for
2. Select appropriate search parameters from the available list above
3. Build a valid FHIR search query string using the correct syntax
4. Use appropriate modifiers, prefixes, and combinators based on the parameter types
5. Call {submit_tool} with the complete query string that can be appended to /{target}?
6. If a correct, valid query string cannot be generated — including when the
   request needs a parameter that is not in the available list, or there is
   not enough information — call {reject_tool} with an error and a suggestion
   describing what IS available

IMPORTANT:
- Only use search parameters from the available list above
- Follow FHIR R4 search syntax rules
- Use correct parameter types and modifiers
- Repeat a parameter for AND constraints (e.g. a date lower and upper bound
  as two entries), use comma-joined values only for OR"#,
        target = resource.resource_type,
        param_count = available.len(),
        params_list = params_list,
        include_count = resource.include_values.len(),
        includes_list = includes_list,
        revinclude_count = resource.revinclude_values.len(),
        revincludes_list = revincludes_list,
        syntax = SYNTAX_SUMMARY,
        submit_tool = SUBMIT_TOOL,
        reject_tool = REJECT_TOOL,
    )
}
