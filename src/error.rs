//! Error types for skillsync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(String),

    #[error("missing config: {0}")]
    MissingConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("unresolved metadata conflict: {0}")]
    ConflictUnresolved(String),

    #[error("decision required: {0}")]
    DecisionRequired(String),

    #[error("sync aborted: {0}")]
    Aborted(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{failed} skill(s) failed to reconcile")]
    SkillsFailed { failed: usize },
}

impl SyncError {
    /// Stable machine-readable code used by robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::Io(_) => "io",
            Self::InvalidDocument(_) => "invalid_document",
            Self::Serialization(_) => "serialization",
            Self::SkillNotFound(_) => "skill_not_found",
            Self::ConflictUnresolved(_) => "conflict_unresolved",
            Self::DecisionRequired(_) => "decision_required",
            Self::Aborted(_) => "aborted",
            Self::ValidationFailed(_) => "validation_failed",
            Self::SkillsFailed { .. } => "skills_failed",
        }
    }

    /// Errors whose details were already emitted as part of a command report.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Aborted(_) | Self::SkillsFailed { .. })
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<walkdir::Error> for SyncError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
