//! Error types for artifact registration

use crate::descriptor::ArtifactKind;

/// Errors raised while building the artifact graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    /// Artifact name is empty
    #[error("artifact name must not be empty")]
    EmptyName,

    /// An input handle was not produced by this registry
    #[error("input artifact {name} is not registered")]
    UnknownInput { name: String },

    /// The same input was listed twice
    #[error("input artifact {name} listed more than once")]
    DuplicateInput { name: String },

    /// Same name and kind already registered with different contents
    #[error("artifact {name} ({kind}) already registered with a different descriptor")]
    Conflict { name: String, kind: ArtifactKind },

    /// Unrecognised type tag
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
}
