//! Project permission grants
//!
//! - [`model`]: capabilities, grantees and declared grants
//! - [`identity`]: the `project:group:user:name:mode` import identifier
//! - [`gateway`]: the remote operations the reconciler depends on
//! - [`engine`]: create / verify / read / delete / import

pub mod engine;
pub mod gateway;
pub mod identity;
pub mod model;

pub use engine::{Reconciler, contains_grant};
pub use gateway::PermissionGateway;
pub use identity::{IDENTIFIER_FORMAT, decode, encode};
pub use model::{
    Capability, CapabilityMode, CapabilityName, DeclaredGrant, GrantAttributes, Grantee,
    GranteeCapabilitySet,
};
