//! Tableau REST API document types
//!
//! JSON shapes exchanged with the project permissions and sign-in endpoints.
//! Requests are sent with `Accept: application/json`, so the server answers
//! with the JSON rendering of its XML schema (camelCase keys).

use serde::{Deserialize, Serialize};

/// Reference to a group, user or other object by LUID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
}

impl Owner {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A single capability as it appears on the wire
///
/// Name and mode are kept verbatim; the server may report capabilities
/// outside the set this crate declares, and comparisons are case sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityEntry {
    pub name: String,
    pub mode: String,
}

/// `capabilities: { capability: [...] }` wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesWrapper {
    #[serde(default)]
    pub capability: Vec<CapabilityEntry>,
}

/// Capabilities granted to one group or user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeCapability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Owner>,
    #[serde(default)]
    pub capabilities: CapabilitiesWrapper,
}

/// Project reference returned alongside the permission list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of the `permissions` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
    #[serde(rename = "granteeCapabilities", default)]
    pub grantee_capabilities: Vec<GranteeCapability>,
}

/// Top-level `{ "permissions": ... }` document, used for both GET and PUT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsEnvelope {
    pub permissions: ProjectPermissions,
}

/// Sign-in request with a personal access token
#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub credentials: PatCredentials<'a>,
}

#[derive(Debug, Serialize)]
pub struct PatCredentials<'a> {
    #[serde(rename = "personalAccessTokenName")]
    pub name: &'a str,
    #[serde(rename = "personalAccessTokenSecret")]
    pub secret: &'a str,
    pub site: SiteContent<'a>,
}

#[derive(Debug, Serialize)]
pub struct SiteContent<'a> {
    #[serde(rename = "contentUrl")]
    pub content_url: &'a str,
}

/// Sign-in response
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub credentials: SessionCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCredentials {
    pub token: String,
    pub site: SessionSite,
    #[serde(default)]
    pub user: Option<Owner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSite {
    pub id: String,
    #[serde(rename = "contentUrl", default)]
    pub content_url: String,
}
