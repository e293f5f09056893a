//! Compound grant identifiers
//!
//! A grant is addressed for import by
//! `<project_id>:<group_id>:<user_id>:<capability_name>:<capability_mode>`,
//! with whichever of group/user is unused left empty.

use crate::error::DecodeError;
use crate::permissions::model::{DeclaredGrant, GrantAttributes};
use std::fmt;

/// Human-readable layout of an identifier, used in error messages and help text
pub const IDENTIFIER_FORMAT: &str = "project_id:group_id:user_id:capability_name:capability_mode";

const SEPARATOR: &str = ":";

/// Encode the addressing fields of a grant
pub fn encode(attrs: &GrantAttributes) -> String {
    [
        attrs.project_id.as_str(),
        attrs.group_id.as_deref().unwrap_or_default(),
        attrs.user_id.as_deref().unwrap_or_default(),
        attrs.capability_name.as_str(),
        attrs.capability_mode.as_str(),
    ]
    .join(SEPARATOR)
}

/// Decode an identifier into declared attributes
///
/// Only the field count is checked here. Group/user exclusivity and the
/// capability enumerations are validated when the grant is submitted.
pub fn decode(identifier: &str) -> Result<GrantAttributes, DecodeError> {
    let parts: Vec<&str> = identifier.split(SEPARATOR).collect();
    let &[project_id, group_id, user_id, capability_name, capability_mode] = parts.as_slice() else {
        return Err(DecodeError::MalformedIdentifier {
            identifier: identifier.to_string(),
            fields: parts.len(),
        });
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    Ok(GrantAttributes {
        project_id: project_id.to_string(),
        group_id: non_empty(group_id),
        user_id: non_empty(user_id),
        capability_name: capability_name.to_string(),
        capability_mode: capability_mode.to_string(),
    })
}

impl DeclaredGrant {
    /// Compound identifier of this grant
    pub fn identifier(&self) -> String {
        encode(&self.to_attributes())
    }
}

impl fmt::Display for DeclaredGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}
