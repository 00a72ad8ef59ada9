use thiserror::Error;

/// Failures surfaced by platform calls.
///
/// `DefinitionConflict` is distinct from `AlreadyExists`: the former means
/// a resource with the same name but a different definition is in the way,
/// the latter that an identical create raced with the resource appearing.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{kind} `{id}` was not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} `{id}` already exists")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{kind} `{id}` exists with a different definition: {detail}")]
    DefinitionConflict {
        kind: &'static str,
        id: String,
        detail: String,
    },
    #[error("transient platform failure: {0}")]
    Transient(String),
    #[error("platform state is corrupt: {0}")]
    Corrupt(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;
