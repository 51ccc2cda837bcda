//! Sweep artifact registry
//!
//! Build provenance for simulation experiments.
//!
//! # Core Concepts
//!
//! - [`ArtifactSpec`]: registration input (command, path, inputs, docs)
//! - [`ArtifactDescriptor`]: immutable registered record with provenance hash
//! - [`ArtifactHandle`]: opaque reference used as a dependency
//! - [`ArtifactGraph`]: frozen dependency DAG built via [`ArtifactGraphBuilder`]
//!
//! # Example
//!
//! ```rust
//! use sweep_artifact::{ArtifactGraphBuilder, ArtifactKind, ArtifactSpec};
//!
//! let mut builder = ArtifactGraphBuilder::new();
//! let repo = builder
//!     .register(ArtifactSpec::new("gem5", ArtifactKind::GitRepo).with_path("gem5/"))
//!     .unwrap();
//! let binary = builder
//!     .register(
//!         ArtifactSpec::new("gem5.opt", ArtifactKind::SimulatorBinary)
//!             .with_path("gem5/build/X86/gem5.opt")
//!             .with_input(&repo),
//!     )
//!     .unwrap();
//!
//! let graph = builder.build();
//! assert_eq!(graph.dependencies_of(&binary).len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod descriptor;
mod error;
mod graph;
mod hash;

pub mod catalog;

pub use catalog::{spec_experiment_artifacts, ExperimentArtifacts};
pub use descriptor::{
    normalize_text, ArtifactDescriptor, ArtifactHandle, ArtifactKey, ArtifactKind, ArtifactSpec,
};
pub use error::ArtifactError;
pub use graph::{ArtifactGraph, ArtifactGraphBuilder, ArtifactManifest};
pub use hash::{ContentHash, HashError, ProvenanceHasher};
