//! Permission grant types
//!
//! [`GrantAttributes`] is the declared configuration exactly as a caller
//! supplies it (or as an import identifier decodes to). [`DeclaredGrant`] is
//! the validated form the reconciler works with: the group/user choice is a
//! [`Grantee`] variant and the capability is a typed pair.

use crate::error::ValidationError;
use crate::tableau::types::{CapabilitiesWrapper, CapabilityEntry, GranteeCapability, Owner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability names a project grant may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityName {
    Read,
    Write,
}

impl CapabilityName {
    pub const ALL: [CapabilityName; 2] = [CapabilityName::Read, CapabilityName::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityName::Read => "Read",
            CapabilityName::Write => "Write",
        }
    }
}

impl FromStr for CapabilityName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCapabilityName(s.to_string()))
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a capability is granted or explicitly denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityMode {
    Allow,
    Deny,
}

impl CapabilityMode {
    pub const ALL: [CapabilityMode; 2] = [CapabilityMode::Allow, CapabilityMode::Deny];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityMode::Allow => "Allow",
            CapabilityMode::Deny => "Deny",
        }
    }
}

impl FromStr for CapabilityMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCapabilityMode(s.to_string()))
    }
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (name, mode) pair; its identity is the pair itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub name: CapabilityName,
    pub mode: CapabilityMode,
}

impl Capability {
    pub fn new(name: CapabilityName, mode: CapabilityMode) -> Self {
        Self { name, mode }
    }

    /// Exact, case-sensitive comparison against a capability reported by the server
    pub fn matches(&self, entry: &CapabilityEntry) -> bool {
        entry.name == self.name.as_str() && entry.mode == self.mode.as_str()
    }
}

impl From<Capability> for CapabilityEntry {
    fn from(capability: Capability) -> Self {
        CapabilityEntry {
            name: capability.name.as_str().to_string(),
            mode: capability.mode.as_str().to_string(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.mode)
    }
}

/// The group or user a capability is granted to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Grantee {
    Group(String),
    User(String),
}

impl Grantee {
    pub fn id(&self) -> &str {
        match self {
            Grantee::Group(id) | Grantee::User(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Grantee::Group(_) => "group",
            Grantee::User(_) => "user",
        }
    }

    /// Collection name used in permission URLs (`groups` / `users`)
    pub fn collection(&self) -> &'static str {
        match self {
            Grantee::Group(_) => "groups",
            Grantee::User(_) => "users",
        }
    }

    /// Wire form: exactly one of `group` / `user` populated
    pub fn to_wire(&self, capabilities: Vec<CapabilityEntry>) -> GranteeCapability {
        let owner = Some(Owner::new(self.id()));
        let (group, user) = match self {
            Grantee::Group(_) => (owner, None),
            Grantee::User(_) => (None, owner),
        };
        GranteeCapability {
            group,
            user,
            capabilities: CapabilitiesWrapper {
                capability: capabilities,
            },
        }
    }
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Capabilities the server reports for one grantee on one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GranteeCapabilitySet {
    pub grantee: Grantee,
    pub capabilities: Vec<CapabilityEntry>,
}

impl GranteeCapabilitySet {
    /// Whether this set grants `capability` to `grantee`
    pub fn grants(&self, grantee: &Grantee, capability: &Capability) -> bool {
        self.grantee == *grantee && self.capabilities.iter().any(|c| capability.matches(c))
    }
}

impl TryFrom<GranteeCapability> for GranteeCapabilitySet {
    type Error = GranteeCapability;

    /// Fails (returning the entry) unless exactly one of group/user is present
    fn try_from(entry: GranteeCapability) -> Result<Self, Self::Error> {
        let grantee = match (&entry.group, &entry.user) {
            (Some(group), None) => Grantee::Group(group.id.clone()),
            (None, Some(user)) => Grantee::User(user.id.clone()),
            _ => return Err(entry),
        };
        Ok(Self {
            grantee,
            capabilities: entry.capabilities.capability,
        })
    }
}

/// Declared attributes of one project permission, unvalidated
///
/// Empty strings in `group_id` / `user_id` count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantAttributes {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub capability_name: String,
    pub capability_mode: String,
}

impl GrantAttributes {
    pub fn for_group(
        project_id: impl Into<String>,
        group_id: impl Into<String>,
        capability_name: impl Into<String>,
        capability_mode: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            group_id: Some(group_id.into()),
            user_id: None,
            capability_name: capability_name.into(),
            capability_mode: capability_mode.into(),
        }
    }

    pub fn for_user(
        project_id: impl Into<String>,
        user_id: impl Into<String>,
        capability_name: impl Into<String>,
        capability_mode: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            group_id: None,
            user_id: Some(user_id.into()),
            capability_name: capability_name.into(),
            capability_mode: capability_mode.into(),
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Validate into a [`DeclaredGrant`]
    pub fn validate(&self) -> Result<DeclaredGrant, ValidationError> {
        DeclaredGrant::try_from(self)
    }
}

/// A validated project permission grant
///
/// All fields are part of the grant's identity; a changed field means a
/// different grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredGrant {
    pub project_id: String,
    pub grantee: Grantee,
    pub capability: Capability,
}

impl DeclaredGrant {
    pub fn new(project_id: impl Into<String>, grantee: Grantee, capability: Capability) -> Self {
        Self {
            project_id: project_id.into(),
            grantee,
            capability,
        }
    }

    pub fn to_attributes(&self) -> GrantAttributes {
        let (group_id, user_id) = match &self.grantee {
            Grantee::Group(id) => (Some(id.clone()), None),
            Grantee::User(id) => (None, Some(id.clone())),
        };
        GrantAttributes {
            project_id: self.project_id.clone(),
            group_id,
            user_id,
            capability_name: self.capability.name.to_string(),
            capability_mode: self.capability.mode.to_string(),
        }
    }
}

impl TryFrom<&GrantAttributes> for DeclaredGrant {
    type Error = ValidationError;

    fn try_from(attrs: &GrantAttributes) -> Result<Self, Self::Error> {
        if attrs.project_id.is_empty() {
            return Err(ValidationError::MissingField {
                field: "project_id",
            });
        }

        let grantee = match (attrs.group_id(), attrs.user_id()) {
            (Some(group), None) => Grantee::Group(group.to_string()),
            (None, Some(user)) => Grantee::User(user.to_string()),
            (Some(_), Some(_)) => {
                return Err(ValidationError::ConflictingGrantee {
                    project_id: attrs.project_id.clone(),
                });
            }
            (None, None) => {
                return Err(ValidationError::MissingGrantee {
                    project_id: attrs.project_id.clone(),
                });
            }
        };

        let capability = Capability::new(
            attrs.capability_name.parse()?,
            attrs.capability_mode.parse()?,
        );

        Ok(Self {
            project_id: attrs.project_id.clone(),
            grantee,
            capability,
        })
    }
}

impl From<&DeclaredGrant> for GrantAttributes {
    fn from(grant: &DeclaredGrant) -> Self {
        grant.to_attributes()
    }
}
