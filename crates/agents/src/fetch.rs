//! FHIR server capability discovery

use fquery_core::{CapabilityStatement, PipelineError, ServerMetadata};

/// Fetch `{server_url}/metadata` and build the searchable-resource snapshot.
///
/// This is the pipeline's only network boundary besides the generative
/// calls. No retries are performed; retry and timeout policy belong to the
/// caller, which owns the `reqwest::Client`.
pub async fn fetch_searchable_resources(
    http: &reqwest::Client,
    server_url: &str,
) -> Result<ServerMetadata, PipelineError> {
    let base = server_url.trim_end_matches('/');
    let metadata_url = format!("{}/metadata", base);

    tracing::info!(url = %metadata_url, "Fetching FHIR capability statement");

    let response = http
        .get(&metadata_url)
        .send()
        .await
        .map_err(|e| request_error(&metadata_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::Connectivity {
            url: metadata_url,
            detail: format!("server returned HTTP {}", status),
        });
    }

    let capability: CapabilityStatement = response.json().await.map_err(|e| {
        PipelineError::Connectivity {
            url: metadata_url.clone(),
            detail: format!("response body is not a capability statement: {}", e),
        }
    })?;

    let metadata = ServerMetadata::from_capability(base, &capability)?;

    tracing::info!(
        server = %metadata.server_url,
        fhir_version = metadata.fhir_version.as_deref().unwrap_or("unknown"),
        searchable_types = metadata.resource_types.len(),
        "Capability statement parsed"
    );

    Ok(metadata)
}

fn request_error(url: &str, err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        PipelineError::Timeout(format!("capability fetch from {} timed out", url))
    } else {
        PipelineError::Connectivity {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}
