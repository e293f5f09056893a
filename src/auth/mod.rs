//! Authentication module
//!
//! Provides authentication for the Tableau REST API. Every request carries
//! an `X-Tableau-Auth` session token, obtained either from configuration or
//! by signing in with a personal access token.

pub mod provider;
pub mod token;

pub use provider::{AuthHeader, AuthProvider, BoxedAuthProvider};
pub use token::{PatSignInProvider, SessionTokenProvider};

use crate::config::TableauConfig;
use crate::error::AuthError;

/// Create an auth provider from configuration
///
/// A pre-issued session token wins over personal access token credentials,
/// since it needs no network round trip.
pub async fn create_auth_provider(config: &TableauConfig) -> Result<BoxedAuthProvider, AuthError> {
    if let Some(token) = &config.token {
        let site_id = config.site_id.clone().ok_or(AuthError::NotConfigured)?;
        return Ok(Box::new(SessionTokenProvider::new(
            token.expose_secret(),
            site_id,
        )?));
    }

    match (&config.token_name, &config.token_secret) {
        (Some(name), Some(secret)) => Ok(Box::new(
            PatSignInProvider::sign_in(config, name, secret).await?,
        )),
        _ => Err(AuthError::NotConfigured),
    }
}
