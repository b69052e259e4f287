//! Caller-facing session over one discovered FHIR server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fquery_core::{
    PipelineError, QueryOutcome, QueryResult, SearchParameter, ServerMetadata, TypeSelection,
    search,
};

use crate::backend::GenerationBackend;
use crate::fetch::fetch_searchable_resources;
use crate::query::CreateQueryAgent;
use crate::select::SelectTypesAgent;

/// One session against one FHIR server.
///
/// Holds the metadata snapshot fetched at connect time plus the long-lived
/// agent handles bound to it, so repeated calls do not rebuild prompts. The
/// snapshot is read-only; the session is safe to share across concurrent
/// selection/construction calls.
pub struct QuerySession {
    metadata: Arc<ServerMetadata>,
    backend: Arc<dyn GenerationBackend>,
    select_agent: SelectTypesAgent,
    query_agents: Mutex<HashMap<String, Arc<CreateQueryAgent>>>,
}

impl QuerySession {
    /// Fetch the server's capability statement and bind a session to it
    pub async fn connect(
        http: &reqwest::Client,
        server_url: &str,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self, PipelineError> {
        let metadata = Arc::new(fetch_searchable_resources(http, server_url).await?);
        Ok(Self::from_metadata(metadata, backend))
    }

    /// Bind a session to already-fetched metadata
    pub fn from_metadata(
        metadata: Arc<ServerMetadata>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let select_agent = SelectTypesAgent::new(metadata.clone(), backend.clone());
        Self {
            metadata,
            backend,
            select_agent,
            query_agents: Mutex::new(HashMap::new()),
        }
    }

    pub fn metadata(&self) -> &ServerMetadata {
        &self.metadata
    }

    /// Searchable resource types in server-declaration order
    pub fn resource_types(&self) -> &[String] {
        &self.metadata.resource_types
    }

    /// Search parameters the server declares for one type
    pub fn search_params(&self, resource_type: &str) -> Result<&[SearchParameter], PipelineError> {
        self.metadata.search_params(resource_type)
    }

    /// Run the selection stage on free text
    pub async fn select_types(&self, query: &str) -> Result<TypeSelection, PipelineError> {
        self.select_agent.select_types(query).await
    }

    /// Run the construction stage for an explicit resource type.
    ///
    /// The type may come from a prior [`Self::select_types`] call or be a
    /// caller override that bypasses selection entirely.
    pub async fn build_query(
        &self,
        resource_type: &str,
        query: &str,
    ) -> Result<QueryOutcome, PipelineError> {
        let agent = self.query_agent(resource_type)?;
        agent.build_query(query).await
    }

    /// The full request URL for a validated query
    pub fn query_url(&self, resource_type: &str, result: &QueryResult) -> String {
        search::assemble_url(
            &self.metadata.server_url,
            resource_type,
            &result.query_string,
        )
    }

    fn query_agent(&self, resource_type: &str) -> Result<Arc<CreateQueryAgent>, PipelineError> {
        let mut agents = self
            .query_agents
            .lock()
            .expect("query agent cache lock poisoned");
        if let Some(agent) = agents.get(resource_type) {
            return Ok(agent.clone());
        }

        let agent = Arc::new(CreateQueryAgent::new(
            resource_type,
            self.metadata.clone(),
            self.backend.clone(),
        )?);
        agents.insert(resource_type.to_string(), agent.clone());
        tracing::debug!(resource_type = resource_type, "Cached construction agent");
        Ok(agent)
    }
}
