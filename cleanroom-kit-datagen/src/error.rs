use cleanroom_kit_platform::PlatformError;
use thiserror::Error;

/// Failures raised while seeding, generating, or verifying datasets.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),
    #[error("source data is unavailable: {0}")]
    SourceUnavailable(String),
    #[error("source produced no usable rows: {0}")]
    EmptySourceSet(String),
    #[error("source row cannot be interpreted: {0}")]
    MalformedRow(String),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type GenerateResult<T> = Result<T, GenerateError>;
