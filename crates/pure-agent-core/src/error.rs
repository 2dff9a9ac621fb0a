use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// ValidationIssue
// ---------------------------------------------------------------------------

/// A single field-level validation failure.
///
/// `path` is dot-joined (`pr.title`, `actions.1`); an empty path refers to the
/// document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Render issues the way they are surfaced to callers: `path: message; ...`.
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// ExportError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    /// Structural or cross-field rule violations in a configuration document.
    #[error("invalid export config: {}", format_issues(.0))]
    InvalidConfig(Vec<ValidationIssue>),

    /// A handler's `validate` rejected the run context.
    #[error("Validation failed for action '{action}': {source}")]
    ActionValidation {
        action: String,
        #[source]
        source: Box<ExportError>,
    },

    /// Raised by `validate` implementations.
    #[error("{0}")]
    Precondition(String),

    /// External API, subprocess or file failure, wrapped with the operation it
    /// belonged to.
    #[error("{context}: {source}")]
    Collaborator {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    /// Engine invariant violations. Never a user input problem.
    #[error("internal error: {0}")]
    Internal(String),

    /// Bare Linear API failure; callers add the operation context.
    #[error(transparent)]
    Linear(#[from] crate::services::linear::LinearError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        ExportError::Precondition(msg.into())
    }

    /// Wrap a collaborator failure with an operation-context prefix.
    pub fn wrap(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ExportError::Collaborator {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Issues carried by an input validation failure, if this is one.
    pub fn issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            ExportError::InvalidConfig(issues) => Some(issues),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Fail with an internal error when a condition guaranteed by a prior
/// `validate` call does not hold.
pub fn require_validated<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        ExportError::Internal(format!(
            "{field} missing; validate() should have been called first"
        ))
    })
}
