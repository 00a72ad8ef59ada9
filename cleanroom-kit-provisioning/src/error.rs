use cleanroom_kit_platform::PlatformError;
use thiserror::Error;

use crate::types::ResourceKind;

/// Failures raised while publishing. The three groups map to distinct
/// operator actions: fix the request, retry later, or resolve the naming
/// collision by hand.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("invalid publish request: {0}")]
    Input(String),
    #[error("{kind} `{id}` conflicts with an existing definition: {reason}")]
    Conflict {
        kind: ResourceKind,
        id: String,
        reason: String,
    },
    #[error("transient platform failure while ensuring {kind} `{id}`: {source}")]
    Transient {
        kind: ResourceKind,
        id: String,
        #[source]
        source: PlatformError,
    },
    #[error("platform failure while ensuring {kind} `{id}`: {source}")]
    Platform {
        kind: ResourceKind,
        id: String,
        #[source]
        source: PlatformError,
    },
}

impl PublishError {
    /// Folds a platform failure into the publish taxonomy. A missing
    /// dependency is a request problem; an unexpected existing resource is
    /// a conflict.
    pub(crate) fn from_platform(kind: ResourceKind, id: &str, source: PlatformError) -> Self {
        match source {
            PlatformError::NotFound {
                kind: missing,
                id: missing_id,
            } => Self::Input(format!(
                "{kind} `{id}` depends on {missing} `{missing_id}`, which does not exist"
            )),
            PlatformError::AlreadyExists { .. } | PlatformError::DefinitionConflict { .. } => {
                Self::Conflict {
                    kind,
                    id: id.to_string(),
                    reason: source.to_string(),
                }
            }
            PlatformError::Transient(_) => Self::Transient {
                kind,
                id: id.to_string(),
                source,
            },
            PlatformError::Corrupt(_) => Self::Platform {
                kind,
                id: id.to_string(),
                source,
            },
        }
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
