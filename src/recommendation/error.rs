//! Error types for recommendation application

use thiserror::Error;

/// A resource string is missing a component the operation needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("resource '{resource}' has no '{segment}' segment")]
    MissingSegment {
        segment: &'static str,
        resource: String,
    },

    #[error("cannot read a machine type from '{0}'")]
    MachineType(String),
}

/// Everything that can abort `apply`
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Recommendation is not in the Active state
    #[error("recommendation must be active (state: {state})")]
    NotActive { state: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `value` of a test or replace operation is not a string
    #[error("value must be of type string, found {found}")]
    ValueType { found: &'static str },

    /// Test operation carries neither `value` nor `valueMatcher`
    #[error("test operation on '{path}' specifies neither value nor valueMatcher")]
    MissingCondition { path: String },

    /// Structured payload could not be read
    #[error("invalid operation payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("the operation is not supported: {action} {resource_type} {path}")]
    Unsupported {
        action: String,
        resource_type: String,
        path: String,
    },

    /// A test operation evaluated to false
    #[error("{path} of '{resource}' is not as expected (observed '{observed}')")]
    ConditionNotMet {
        path: String,
        resource: String,
        observed: String,
    },

    /// A call into the cloud backend failed
    #[error(transparent)]
    Capability(#[from] anyhow::Error),
}

impl ApplyError {
    pub(crate) fn unsupported(action: &str, resource_type: &str, path: &str) -> Self {
        Self::Unsupported {
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            path: path.to_string(),
        }
    }

    /// Whether the failure came from the backend rather than the document
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Capability(_))
    }
}

pub type Result<T> = std::result::Result<T, ApplyError>;
