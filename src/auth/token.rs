//! Session token providers
//!
//! `SessionTokenProvider` wraps a token issued out of band;
//! `PatSignInProvider` exchanges a personal access token for a session.

use crate::auth::provider::{AuthHeader, AuthProvider};
use crate::config::TableauConfig;
use crate::error::AuthError;
use crate::tableau::client::build_http_client;
use crate::tableau::types::{PatCredentials, SignInRequest, SignInResponse, SiteContent};
use crate::util::SecretString;
use async_trait::async_trait;
use tracing::{info, instrument};

/// Pre-issued session token provider
#[derive(Debug, Clone)]
pub struct SessionTokenProvider {
    token: SecretString,
    site_id: String,
}

impl SessionTokenProvider {
    /// Create a provider from a token and the site it was issued for
    pub fn new(token: impl Into<String>, site_id: impl Into<String>) -> Result<Self, AuthError> {
        let token = SecretString::new(token);
        let site_id = site_id.into();

        if token.is_empty() || site_id.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Self { token, site_id })
    }
}

#[async_trait]
impl AuthProvider for SessionTokenProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        Ok(AuthHeader::TableauAuth(self.token.clone()))
    }

    fn site_id(&self) -> &str {
        &self.site_id
    }

    fn auth_type(&self) -> &'static str {
        "Session Token"
    }
}

/// Personal access token sign-in provider
#[derive(Debug, Clone)]
pub struct PatSignInProvider {
    session: SecretString,
    site_id: String,
    user_id: Option<String>,
}

impl PatSignInProvider {
    /// Sign in to `{api}/auth/signin` and keep the resulting session
    #[instrument(skip(config, secret), fields(site = %config.site))]
    pub async fn sign_in(
        config: &TableauConfig,
        token_name: &str,
        secret: &SecretString,
    ) -> Result<Self, AuthError> {
        if token_name.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let http = build_http_client(config).map_err(|e| AuthError::SignIn(e.to_string()))?;
        let body = SignInRequest {
            credentials: PatCredentials {
                name: token_name,
                secret: secret.expose_secret(),
                site: SiteContent {
                    content_url: &config.site,
                },
            },
        };

        let response = http
            .post(format!("{}/auth/signin", config.api_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::SignIn(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AuthError::SignIn(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::SignIn(format!("unexpected sign-in response: {}", e)))?;
        let credentials = signed_in.credentials;

        info!(site_id = %credentials.site.id, "Signed in to Tableau");

        Ok(Self {
            session: SecretString::new(credentials.token),
            site_id: credentials.site.id,
            user_id: credentials.user.map(|u| u.id),
        })
    }

    /// LUID of the user the access token belongs to, when reported
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[async_trait]
impl AuthProvider for PatSignInProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        Ok(AuthHeader::TableauAuth(self.session.clone()))
    }

    fn site_id(&self) -> &str {
        &self.site_id
    }

    fn auth_type(&self) -> &'static str {
        "Personal Access Token"
    }
}
