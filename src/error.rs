//! Error types for tableau-grants
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and collapse them into `anyhow` only at the binary boundary.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tableau API error: {0}")]
    Tableau(#[from] TableauError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Tableau REST API errors
///
/// This is the failure surface of the permission gateway. `Request` covers
/// transport failures; every other variant is an upstream failure reported
/// by the server or a body we could not understand.
#[derive(Error, Debug)]
pub enum TableauError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Tableau API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: invalid or expired session token")]
    Unauthorized,

    #[error("Forbidden: insufficient permissions for {action}")]
    Forbidden { action: String },

    #[error("Invalid response from Tableau: {0}")]
    InvalidResponse(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl TableauError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => TableauError::Unauthorized,
            403 => TableauError::Forbidden {
                action: "this operation".into(),
            },
            404 => TableauError::NotFound {
                resource: if body.is_empty() {
                    "requested resource".into()
                } else {
                    body.to_string()
                },
            },
            _ => TableauError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }

    /// Whether the failure happened before the server produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, TableauError::Request(_))
    }

    /// Whether the server reported the addressed resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, TableauError::NotFound { .. })
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication configured")]
    NotConfigured,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Sign-in failed: {0}")]
    SignIn(String),
}

/// Local validation failures for a declared grant
///
/// These are detected before any remote call and are never retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("grant on project '{project_id}' declares both group_id and user_id")]
    ConflictingGrantee { project_id: String },

    #[error("grant on project '{project_id}' declares neither group_id nor user_id")]
    MissingGrantee { project_id: String },

    #[error("missing required attribute: {field}")]
    MissingField { field: &'static str },

    #[error("invalid capability_name '{0}': expected one of Read, Write")]
    InvalidCapabilityName(String),

    #[error("invalid capability_mode '{0}': expected one of Allow, Deny (case sensitive)")]
    InvalidCapabilityMode(String),
}

impl ValidationError {
    /// True for both halves of the group/user exclusivity rule
    pub fn is_conflicting_grantee(&self) -> bool {
        matches!(
            self,
            ValidationError::ConflictingGrantee { .. } | ValidationError::MissingGrantee { .. }
        )
    }
}

/// Import identifier decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(
        "Expected import identifier with format: `project_id:group_id:user_id:capability_name:capability_mode`. Got: {identifier:?} ({fields} fields)"
    )]
    MalformedIdentifier { identifier: String, fields: usize },
}

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Invalid grant: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid identifier: {0}")]
    Decode(#[from] DecodeError),

    #[error(
        "Could not {operation} permission {capability} on project {project_id} for {grantee}: {source}"
    )]
    UpstreamFailure {
        operation: &'static str,
        project_id: String,
        grantee: String,
        capability: String,
        #[source]
        source: TableauError,
    },

    #[error("Permission {capability} for {grantee} not found on project {project_id}")]
    NotFound {
        project_id: String,
        grantee: String,
        capability: String,
    },

    #[error("Project permissions do not support updates ({identifier}); delete and recreate instead")]
    UpdateUnsupported { identifier: String },
}

impl ReconcileError {
    /// Gateway failure, if this error came from the remote service
    pub fn upstream(&self) -> Option<&TableauError> {
        match self {
            ReconcileError::UpstreamFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Tableau API operations
pub type TableauResult<T> = std::result::Result<T, TableauError>;

/// Result type alias for reconciliation operations
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
