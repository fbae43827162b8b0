use thiserror::Error;

pub type Result<T> = std::result::Result<T, EffectError>;

/// Reasons the effect cannot start. All of them disable it for the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The host has no drawing surface to render onto.
    #[error("drawing surface not available")]
    MissingSurface,

    #[error("logging setup failed: {0}")]
    Logging(String),
}
