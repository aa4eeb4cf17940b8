/// Convenience result type used across scenewright.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by library APIs.
///
/// Untrusted upstream content never surfaces here: the pipeline turns it into refused envelopes.
/// These variants are reserved for caller mistakes and infrastructure failures.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text that could not be parsed as JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unreadable or inconsistent configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The scene server or upstream collaborator is unavailable.
    #[error("session error: {0}")]
    Session(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`SceneError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SceneError::Session`] value.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
