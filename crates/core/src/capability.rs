use serde::Deserialize;

/// FHIR CapabilityStatement resource, restricted to the slice this crate reads.
///
/// Servers attach plenty of other fields (software, implementation, formats);
/// deserialization ignores everything the pipeline does not consume.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    pub fhir_version: Option<String>,
    #[serde(default)]
    pub rest: Vec<CapabilityRest>,
}

impl CapabilityStatement {
    /// The `rest` entry describing the server role, if the statement has one
    pub fn server_rest(&self) -> Option<&CapabilityRest> {
        self.rest.iter().find(|rest| rest.mode == "server")
    }
}

/// REST capability declaration
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityRest {
    pub mode: String,
    #[serde(default)]
    pub resource: Vec<CapabilityResource>,
}

/// Per-resource-type capability entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub profile: Option<String>,
    #[serde(default)]
    pub interaction: Vec<CapabilityInteraction>,
    #[serde(default)]
    pub search_param: Vec<CapabilitySearchParam>,
    #[serde(default)]
    pub search_include: Vec<String>,
    #[serde(default)]
    pub search_rev_include: Vec<String>,
}

impl CapabilityResource {
    /// Whether the server declares the given interaction code for this type
    pub fn supports_interaction(&self, code: &str) -> bool {
        self.interaction.iter().any(|i| i.code == code)
    }
}

/// Declared interaction (`read`, `search-type`, `create`, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityInteraction {
    pub code: String,
}

/// Declared search parameter for one resource type
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilitySearchParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub documentation: Option<String>,
}
