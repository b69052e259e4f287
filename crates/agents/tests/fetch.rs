//! Capability fetcher tests against a mock FHIR server.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fquery_agents::fetch_searchable_resources;
use fquery_core::PipelineError;

async fn mock_metadata_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn fetches_and_parses_capability_statement() {
    common::init_tracing();
    let server =
        mock_metadata_server(ResponseTemplate::new(200).set_body_json(common::capability_json()))
            .await;

    let http = reqwest::Client::new();
    // Trailing slash on the configured URL must not produce `//metadata`
    let metadata = fetch_searchable_resources(&http, &format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(metadata.server_url, server.uri());
    assert_eq!(metadata.fhir_version.as_deref(), Some("4.0.1"));
    assert_eq!(metadata.resource_types, vec!["Patient", "Observation"]);

    let patient_params = metadata.search_params("Patient").unwrap();
    let names: Vec<&str> = patient_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["active", "address-state", "birthdate", "family", "gender", "given"]
    );
}

#[tokio::test]
async fn non_2xx_status_is_a_connectivity_error() {
    let server = mock_metadata_server(ResponseTemplate::new(500)).await;

    let http = reqwest::Client::new();
    let err = fetch_searchable_resources(&http, &server.uri())
        .await
        .unwrap_err();

    match err {
        PipelineError::Connectivity { url, detail } => {
            assert_eq!(url, format!("{}/metadata", server.uri()));
            assert!(detail.contains("500"), "{}", detail);
        }
        other => panic!("expected Connectivity, got {:?}", other),
    }
}

#[tokio::test]
async fn non_json_body_is_a_connectivity_error() {
    let server =
        mock_metadata_server(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .await;

    let http = reqwest::Client::new();
    let err = fetch_searchable_resources(&http, &server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Connectivity { .. }), "{:?}", err);
}

#[tokio::test]
async fn wrong_resource_type_is_a_connectivity_error() {
    let body = json!({"resourceType": "Bundle", "rest": []});
    let server = mock_metadata_server(ResponseTemplate::new(200).set_body_json(body)).await;

    let http = reqwest::Client::new();
    let err = fetch_searchable_resources(&http, &server.uri())
        .await
        .unwrap_err();

    match err {
        PipelineError::Connectivity { detail, .. } => {
            assert!(detail.contains("Bundle"), "{}", detail)
        }
        other => panic!("expected Connectivity, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    let http = reqwest::Client::new();
    // Nothing listens on this port
    let err = fetch_searchable_resources(&http, "http://127.0.0.1:1")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Connectivity { .. }), "{:?}", err);
}

#[tokio::test]
async fn slow_server_surfaces_as_timeout() {
    let server = mock_metadata_server(
        ResponseTemplate::new(200)
            .set_body_json(common::capability_json())
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = fetch_searchable_resources(&http, &server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Timeout(_)), "{:?}", err);
}
