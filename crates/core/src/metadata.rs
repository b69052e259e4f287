use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityStatement;
use crate::error::PipelineError;
use crate::params;

/// FHIR search parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParameter {
    pub name: String,
    pub param_type: Option<String>,
    pub documentation: Option<String>,
}

impl fmt::Display for SearchParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name,
            self.param_type.as_deref().unwrap_or("special")
        )?;
        if let Some(doc) = &self.documentation {
            write!(f, ": {}", doc)?;
        }
        Ok(())
    }
}

/// Search capabilities of a single resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub resource_type: String,
    pub profile: Option<String>,
    pub interactions: Vec<String>,
    /// Sorted by parameter name
    pub search_params: Vec<SearchParameter>,
    /// Sorted `_include` values the server accepts for this type
    pub include_values: Vec<String>,
    /// Sorted `_revinclude` values the server accepts for this type
    pub revinclude_values: Vec<String>,
}

/// Immutable snapshot of a server's searchable surface.
///
/// Built once per session from a fetched CapabilityStatement and shared
/// read-only across the selection and construction stages. Only resource
/// types that declare the `search-type` interaction and at least one search
/// parameter are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMetadata {
    pub server_url: String,
    pub fhir_version: Option<String>,
    /// Searchable type names in server-declaration order
    pub resource_types: Vec<String>,
    /// Full per-type metadata, keyed by type name
    pub resources: BTreeMap<String, ResourceMetadata>,
}

impl ServerMetadata {
    /// Build the snapshot from a parsed capability statement.
    ///
    /// Shape problems (not a CapabilityStatement, no server-mode `rest`
    /// entry) are connectivity-class failures: the body the server returned
    /// is not usable FHIR metadata.
    pub fn from_capability(
        server_url: &str,
        capability: &CapabilityStatement,
    ) -> Result<Self, PipelineError> {
        let server_url = server_url.trim_end_matches('/');
        let metadata_url = format!("{}/metadata", server_url);

        if capability.resource_type != "CapabilityStatement" {
            return Err(PipelineError::Connectivity {
                url: metadata_url,
                detail: format!(
                    "expected a CapabilityStatement, got resourceType '{}'",
                    capability.resource_type
                ),
            });
        }
        if capability.rest.is_empty() {
            return Err(PipelineError::Connectivity {
                url: metadata_url,
                detail: "invalid CapabilityStatement: missing 'rest' array".to_string(),
            });
        }
        let Some(server_rest) = capability.server_rest() else {
            return Err(PipelineError::Connectivity {
                url: metadata_url,
                detail: "server does not expose capability information (no rest entry with mode 'server')"
                    .to_string(),
            });
        };

        let mut resource_types = Vec::new();
        let mut resources = BTreeMap::new();

        for resource in &server_rest.resource {
            if !resource.supports_interaction("search-type") {
                continue;
            }
            if resource.search_param.is_empty() {
                continue;
            }
            // First declaration wins if a server repeats a type
            if resources.contains_key(&resource.resource_type) {
                continue;
            }

            let mut search_params: Vec<SearchParameter> = resource
                .search_param
                .iter()
                .map(|p| SearchParameter {
                    name: p.name.clone(),
                    param_type: p.param_type.clone(),
                    documentation: p.documentation.clone(),
                })
                .collect();
            search_params.sort_by(|a, b| a.name.cmp(&b.name));

            let mut include_values = resource.search_include.clone();
            include_values.sort();
            let mut revinclude_values = resource.search_rev_include.clone();
            revinclude_values.sort();

            resource_types.push(resource.resource_type.clone());
            resources.insert(
                resource.resource_type.clone(),
                ResourceMetadata {
                    resource_type: resource.resource_type.clone(),
                    profile: resource.profile.clone(),
                    interactions: resource.interaction.iter().map(|i| i.code.clone()).collect(),
                    search_params,
                    include_values,
                    revinclude_values,
                },
            );
        }

        Ok(Self {
            server_url: server_url.to_string(),
            fhir_version: capability.fhir_version.clone(),
            resource_types,
            resources,
        })
    }

    /// Whether the server advertises the given type as searchable
    pub fn supports(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    /// Full metadata for one type
    pub fn resource(&self, resource_type: &str) -> Option<&ResourceMetadata> {
        self.resources.get(resource_type)
    }

    /// Full metadata for one type, or `InvalidArgument` with a preview of
    /// what the server does advertise. Unknown types are a caller contract
    /// violation, not a runtime path.
    pub fn require_resource(&self, resource_type: &str) -> Result<&ResourceMetadata, PipelineError> {
        self.resources.get(resource_type).ok_or_else(|| {
            PipelineError::InvalidArgument(format!(
                "resource type '{}' not found in metadata for {}; available types include: {}",
                resource_type,
                self.server_url,
                self.available_types_preview()
            ))
        })
    }

    /// Search parameters declared by the server for one type
    pub fn search_params(&self, resource_type: &str) -> Result<&[SearchParameter], PipelineError> {
        Ok(&self.require_resource(resource_type)?.search_params)
    }

    /// Parameter names legal in a generated query for one type: the type's
    /// own parameters plus the universal common table.
    pub fn allowed_param_names(
        &self,
        resource_type: &str,
    ) -> Result<BTreeSet<String>, PipelineError> {
        let mut names: BTreeSet<String> = self
            .search_params(resource_type)?
            .iter()
            .map(|p| p.name.clone())
            .collect();
        names.extend(params::common_search_params().iter().map(|p| p.name.clone()));
        Ok(names)
    }

    fn available_types_preview(&self) -> String {
        let mut sorted: Vec<&str> = self.resource_types.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
            .into_iter()
            .take(10)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
