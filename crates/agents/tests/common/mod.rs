//! Shared fixtures: a canned capability statement and a deterministic
//! generation backend that replays scripted tool invocations.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use fquery_agents::{GenerationBackend, Tool, ToolInvocation};
use fquery_core::{CapabilityStatement, PipelineError, ServerMetadata};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// CapabilityStatement for a server exposing Patient and Observation
pub fn capability_json() -> JsonValue {
    json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "fhirVersion": "4.0.1",
        "rest": [{
            "mode": "server",
            "resource": [
                {
                    "type": "Patient",
                    "interaction": [{"code": "read"}, {"code": "search-type"}],
                    "searchParam": [
                        {"name": "gender", "type": "token", "documentation": "Gender of the patient"},
                        {"name": "birthdate", "type": "date", "documentation": "The patient's date of birth"},
                        {"name": "address-state", "type": "string"},
                        {"name": "active", "type": "token"},
                        {"name": "family", "type": "string"},
                        {"name": "given", "type": "string"}
                    ],
                    "searchInclude": ["Patient:organization"],
                    "searchRevInclude": ["Observation:patient"]
                },
                {
                    "type": "Observation",
                    "interaction": [{"code": "search-type"}],
                    "searchParam": [
                        {"name": "patient", "type": "reference"},
                        {"name": "subject", "type": "reference"},
                        {"name": "code", "type": "token"},
                        {"name": "date", "type": "date"}
                    ]
                }
            ]
        }]
    })
}

pub fn server_metadata() -> Arc<ServerMetadata> {
    let capability: CapabilityStatement =
        serde_json::from_value(capability_json()).expect("fixture should deserialize");
    Arc::new(
        ServerMetadata::from_capability("https://r4.example.org", &capability)
            .expect("fixture should produce metadata"),
    )
}

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub input: String,
    pub tool_names: Vec<String>,
}

/// Deterministic [`GenerationBackend`] replaying canned invocations in order
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ToolInvocation, PipelineError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<ToolInvocation, PipelineError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(invocations: Vec<ToolInvocation>) -> Arc<Self> {
        Self::new(invocations.into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        system: &str,
        input: &str,
        tools: &[Tool],
    ) -> Result<ToolInvocation, PipelineError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            input: input.to_string(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted backend exhausted")
    }
}

pub fn invocation(name: &str, input: JsonValue) -> ToolInvocation {
    ToolInvocation {
        name: name.to_string(),
        input,
    }
}

pub fn submit_query(query_string: &str) -> ToolInvocation {
    invocation("submit_query", json!({"query_string": query_string}))
}

pub fn select_single(selected_type: &str, confidence: f64) -> ToolInvocation {
    invocation(
        "select_resource_types",
        json!({
            "resource_types": [{
                "selected_type": selected_type,
                "confidence": confidence,
                "reasoning": format!("query maps directly onto {}", selected_type)
            }]
        }),
    )
}
