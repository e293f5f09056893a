//! Tableau project permission grants
//!
//! Declaratively manages capability grants on Tableau projects: each grant
//! names one project, one grantee (a group or a user) and one capability
//! (`Read`/`Write`, `Allow`/`Deny`). The [`permissions::Reconciler`] creates,
//! verifies, deletes and imports grants through a
//! [`permissions::PermissionGateway`], implemented by [`tableau::TableauClient`].
//!
//! ## Grant identifiers
//!
//! ```text
//! <project_id>:<group_id>:<user_id>:<capability_name>:<capability_mode>
//! ```
//!
//! Exactly one of `group_id` / `user_id` is non-empty, e.g.
//! `p1:g1::Read:Allow` or `p1::u1:Write:Deny`.
//!
//! ## Example Configuration
//!
//! ```toml
//! [tableau]
//! url = "https://tableau.example.com"
//! site = "analytics"
//! token_name = "ci"
//! # token_secret from TABLEAU_TOKEN_SECRET env var
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod permissions;
pub mod tableau;
pub mod util;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use permissions::{DeclaredGrant, GrantAttributes, Reconciler};
pub use tableau::TableauClient;
