//! Tests for capability-statement parsing and the metadata snapshot.

use serde_json::json;

use fquery_core::{CapabilityStatement, PipelineError, ServerMetadata};

fn capability_json() -> serde_json::Value {
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
                        {"name": "active", "type": "token"},
                        {"name": "birthdate", "type": "date"},
                        {"name": "address-state", "type": "string"}
                    ],
                    "searchInclude": ["Patient:organization", "Patient:general-practitioner"],
                    "searchRevInclude": ["Observation:patient"]
                },
                {
                    // search-type declared but no parameters: excluded
                    "type": "Binary",
                    "interaction": [{"code": "search-type"}],
                    "searchParam": []
                },
                {
                    // no search-type interaction: excluded
                    "type": "StructureDefinition",
                    "interaction": [{"code": "read"}],
                    "searchParam": [{"name": "url", "type": "uri"}]
                },
                {
                    "type": "Observation",
                    "interaction": [{"code": "search-type"}],
                    "searchParam": [
                        {"name": "patient", "type": "reference"},
                        {"name": "code", "type": "token"},
                        {"name": "date", "type": "date"}
                    ]
                }
            ]
        }]
    })
}

fn parse(value: serde_json::Value) -> CapabilityStatement {
    serde_json::from_value(value).expect("capability fixture should deserialize")
}

#[test]
fn builds_snapshot_in_declaration_order() {
    let metadata = ServerMetadata::from_capability("https://r4.example.org/", &parse(capability_json()))
        .unwrap();

    assert_eq!(metadata.server_url, "https://r4.example.org");
    assert_eq!(metadata.fhir_version.as_deref(), Some("4.0.1"));
    assert_eq!(metadata.resource_types, vec!["Patient", "Observation"]);
}

#[test]
fn every_listed_type_has_parameters() {
    let metadata =
        ServerMetadata::from_capability("https://r4.example.org", &parse(capability_json())).unwrap();

    for name in &metadata.resource_types {
        let params = metadata.search_params(name).unwrap();
        assert!(!params.is_empty(), "{} listed without parameters", name);
    }
    assert!(!metadata.supports("Binary"));
    assert!(!metadata.supports("StructureDefinition"));
}

#[test]
fn search_params_and_includes_are_sorted() {
    let metadata =
        ServerMetadata::from_capability("https://r4.example.org", &parse(capability_json())).unwrap();

    let patient = metadata.resource("Patient").unwrap();
    let names: Vec<&str> = patient.search_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["active", "address-state", "birthdate", "gender"]);
    assert_eq!(
        patient.include_values,
        vec!["Patient:general-practitioner", "Patient:organization"]
    );
}

#[test]
fn allowed_params_include_universal_table() {
    let metadata =
        ServerMetadata::from_capability("https://r4.example.org", &parse(capability_json())).unwrap();

    let allowed = metadata.allowed_param_names("Patient").unwrap();
    assert!(allowed.contains("gender"));
    assert!(allowed.contains("_sort"));
    assert!(allowed.contains("_count"));
    assert!(!allowed.contains("code"));
}

#[test]
fn unknown_type_is_an_invalid_argument() {
    let metadata =
        ServerMetadata::from_capability("https://r4.example.org", &parse(capability_json())).unwrap();

    let err = metadata.search_params("MedicationRequest").unwrap_err();
    match err {
        PipelineError::InvalidArgument(msg) => {
            assert!(msg.contains("MedicationRequest"));
            assert!(msg.contains("Patient"), "should list available types: {}", msg);
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[test]
fn rejects_non_capability_bodies() {
    let not_capability = parse(json!({
        "resourceType": "OperationOutcome",
        "rest": [{"mode": "server", "resource": []}]
    }));
    let err = ServerMetadata::from_capability("https://r4.example.org", &not_capability).unwrap_err();
    assert!(matches!(err, PipelineError::Connectivity { .. }), "{:?}", err);
}

#[test]
fn rejects_statement_without_server_rest() {
    let client_only = parse(json!({
        "resourceType": "CapabilityStatement",
        "rest": [{"mode": "client", "resource": []}]
    }));
    let err = ServerMetadata::from_capability("https://r4.example.org", &client_only).unwrap_err();
    match err {
        PipelineError::Connectivity { url, detail } => {
            assert_eq!(url, "https://r4.example.org/metadata");
            assert!(detail.contains("mode 'server'"), "{}", detail);
        }
        other => panic!("expected Connectivity, got {:?}", other),
    }

    let no_rest = parse(json!({"resourceType": "CapabilityStatement"}));
    let err = ServerMetadata::from_capability("https://r4.example.org", &no_rest).unwrap_err();
    assert!(matches!(err, PipelineError::Connectivity { .. }));
}
