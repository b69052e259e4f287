//! Resource-type selection stage

use std::sync::Arc;

use serde_json::json;

use fquery_core::{
    PipelineError, SelectTypeError, SelectedType, ServerMetadata, TypeSelection,
    common_search_params,
};

use crate::backend::GenerationBackend;
use crate::client::Tool;

pub(crate) const SELECT_TOOL: &str = "select_resource_types";
pub(crate) const REJECT_TOOL: &str = "reject_query";

/// Agent that maps free text onto the resource types one server advertises.
///
/// Bound at construction time to one [`ServerMetadata`] snapshot; the system
/// prompt is built once and reused across calls.
pub struct SelectTypesAgent {
    metadata: Arc<ServerMetadata>,
    backend: Arc<dyn GenerationBackend>,
    system_prompt: String,
}

impl SelectTypesAgent {
    pub fn new(metadata: Arc<ServerMetadata>, backend: Arc<dyn GenerationBackend>) -> Self {
        let system_prompt = build_system_prompt(&metadata);
        Self {
            metadata,
            backend,
            system_prompt,
        }
    }

    /// Analyze free text and rank the plausible resource types.
    ///
    /// Returns [`TypeSelection::Failed`] when the server advertises nothing
    /// that could satisfy the request; a first-class outcome, not an `Err`.
    pub async fn select_types(&self, query: &str) -> Result<TypeSelection, PipelineError> {
        tracing::info!(query, "Selecting resource types");

        let tools = selection_tools();
        let invocation = self
            .backend
            .generate(&self.system_prompt, query, &tools)
            .await?;

        match invocation.name.as_str() {
            SELECT_TOOL => {
                let raw = invocation.input.get("resource_types").cloned().ok_or_else(|| {
                    PipelineError::ConstraintViolation(
                        "selection payload missing 'resource_types'".to_string(),
                    )
                })?;
                let candidates: Vec<SelectedType> = serde_json::from_value(raw).map_err(|e| {
                    PipelineError::ConstraintViolation(format!("malformed selection payload: {}", e))
                })?;
                self.validate_candidates(&candidates)?;

                tracing::info!(
                    candidates = candidates.len(),
                    top = %candidates[0].selected_type,
                    "Resource types selected"
                );
                Ok(TypeSelection::Selected(candidates))
            }
            REJECT_TOOL => {
                let failure: SelectTypeError =
                    serde_json::from_value(invocation.input).map_err(|e| {
                        PipelineError::ConstraintViolation(format!(
                            "malformed rejection payload: {}",
                            e
                        ))
                    })?;
                tracing::info!(error = %failure.error, "No plausible resource type");
                Ok(TypeSelection::Failed(failure))
            }
            other => Err(PipelineError::ConstraintViolation(format!(
                "unexpected tool '{}' from selection backend",
                other
            ))),
        }
    }

    /// Enforce the structured contract on a success invocation. The ranking
    /// itself is the model's; this never re-sorts.
    fn validate_candidates(&self, candidates: &[SelectedType]) -> Result<(), PipelineError> {
        if candidates.is_empty() {
            return Err(PipelineError::ConstraintViolation(
                "selection returned an empty candidate list".to_string(),
            ));
        }
        for candidate in candidates {
            if !self.metadata.supports(&candidate.selected_type) {
                return Err(PipelineError::ConstraintViolation(format!(
                    "selected type '{}' is not advertised by {}",
                    candidate.selected_type, self.metadata.server_url
                )));
            }
            if !(0.0..=1.0).contains(&candidate.confidence) {
                return Err(PipelineError::ConstraintViolation(format!(
                    "confidence {} for '{}' is outside [0.0, 1.0]",
                    candidate.confidence, candidate.selected_type
                )));
            }
        }
        for pair in candidates.windows(2) {
            if pair[0].confidence < pair[1].confidence {
                return Err(PipelineError::ConstraintViolation(
                    "candidates are not ranked by descending confidence".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn selection_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: SELECT_TOOL.to_string(),
            description: "Report the ranked FHIR resource types that match the user's query"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resource_types": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "properties": {
                                "selected_type": {
                                    "type": "string",
                                    "description": "The selected resource type name"
                                },
                                "confidence": {
                                    "type": "number",
                                    "minimum": 0.0,
                                    "maximum": 1.0,
                                    "description": "Confidence score for this specific type"
                                },
                                "reasoning": {
                                    "type": "string",
                                    "description": "Why this specific type was selected"
                                }
                            },
                            "required": ["selected_type", "confidence", "reasoning"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["resource_types"],
                "additionalProperties": false
            }),
        },
        Tool {
            name: REJECT_TOOL.to_string(),
            description: "Report that no advertised resource type can satisfy the query"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "error": {
                        "type": "string",
                        "description": "Short description of what went wrong"
                    },
                    "reasoning": {
                        "type": "string",
                        "description": "Why no available type matches"
                    }
                },
                "required": ["error", "reasoning"],
                "additionalProperties": false
            }),
        },
    ]
}

fn build_system_prompt(metadata: &ServerMetadata) -> String {
    let mut types: Vec<&str> = metadata.resource_types.iter().map(String::as_str).collect();
    types.sort_unstable();
    let types_list = types.join("\n");

    let common_hints = common_search_params()
        .iter()
        .map(|p| format!("  - {}", p))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a FHIR resource type selector. Analyze user queries and select the appropriate FHIR resource type(s).

Available searchable resource types ({type_count} total):
{types_list}

Your task:
1. Analyze the user's query to understand what data they want
2. Select the most appropriate resource type(s) from the available list above
3. Call {select_tool} with a list of candidates, each with:
   - selected_type: the resource type name
   - confidence: your confidence score for this specific type (0.0-1.0)
   - reasoning: why this specific type was selected
4. Order candidates by relevance (most relevant first)

Confidence scoring guidelines (per type):
- 0.9-1.0: Exact type name mentioned or very clear semantic match
- 0.7-0.9: Clear semantic match with good context
- 0.5-0.7: Reasonable match but some ambiguity
- 0.3-0.5: Multiple valid options, this is one possibility
- 0.0-0.3: Very uncertain, weak match

Common mappings:
- "patients", "patient demographics", "people" → Patient
- "vital signs", "blood pressure", "lab results", "observations" → Observation
- "medications", "prescriptions", "drugs" → Medication, MedicationRequest
- "encounters", "visits", "appointments" → Encounter
- "procedures", "surgeries", "operations" → Procedure
- "conditions", "diagnoses", "problems", "diseases" → Condition
- "allergies" → AllergyIntolerance
- "immunizations", "vaccinations" → Immunization

Universal search parameters available on every type (context for judging
whether a query is answerable at all):
{common_hints}

Error handling:
- If the requested type doesn't exist in the available list: call {reject_tool} with an error message and reasoning
- If a type exists but the query is ambiguous: return multiple candidates, each with their own confidence
- If the query is too vague: return the most likely types with lower confidence scores

IMPORTANT:
- Only select types from the available list above
- Each candidate should have its own reasoning explaining why THAT specific type matches
- If NO valid type can be found, call {reject_tool} instead — never return an empty list"#,
        type_count = types.len(),
        types_list = types_list,
        common_hints = common_hints,
        select_tool = SELECT_TOOL,
        reject_tool = REJECT_TOOL,
    )
}
