//! Authentication provider trait

use crate::error::AuthError;
use crate::util::SecretString;
// async_trait required for dyn-compatibility with Box<dyn AuthProvider>
use async_trait::async_trait;

/// Authentication provider trait
///
/// Implementations hold a signed-in Tableau session: the token sent with
/// each request and the LUID of the site the session is scoped to.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get the header to attach to an API request
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError>;

    /// LUID of the site this session is bound to
    fn site_id(&self) -> &str;

    /// Get a description of the auth method (for logging)
    fn auth_type(&self) -> &'static str;
}

/// Authentication header to use with requests
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// Session credentials token
    TableauAuth(SecretString),
}

impl AuthHeader {
    /// Get the header name for this auth type
    pub fn header_name(&self) -> &'static str {
        match self {
            AuthHeader::TableauAuth(_) => "X-Tableau-Auth",
        }
    }

    /// Get the header value for this auth type
    pub fn header_value(&self) -> String {
        match self {
            AuthHeader::TableauAuth(token) => token.expose_secret().to_string(),
        }
    }
}

/// Box type alias for auth providers
pub type BoxedAuthProvider = Box<dyn AuthProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_does_not_leak_in_debug() {
        let header = AuthHeader::TableauAuth(SecretString::new("session-token"));
        assert_eq!(header.header_name(), "X-Tableau-Auth");
        assert_eq!(header.header_value(), "session-token");
        assert!(!format!("{:?}", header).contains("session-token"));
    }
}
