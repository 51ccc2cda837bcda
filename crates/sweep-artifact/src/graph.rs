//! Artifact dependency graph
//!
//! Construction happens in [`ArtifactGraphBuilder`]; [`ArtifactGraphBuilder::build`]
//! freezes it into an immutable [`ArtifactGraph`] that the launcher passes
//! around explicitly.
//!
//! Edges point from an input to the artifact built from it. An input must be
//! registered before anything that names it, so the graph is acyclic by
//! construction and registration order is already a valid build order.

use crate::descriptor::{ArtifactDescriptor, ArtifactHandle, ArtifactKey, ArtifactKind, ArtifactSpec};
use crate::error::ArtifactError;
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use serde::{Deserialize, Serialize};

/// Mutable registration phase
#[derive(Debug, Default)]
pub struct ArtifactGraphBuilder {
    graph: DiGraph<ArtifactDescriptor, ()>,
    index: IndexMap<ArtifactKey, NodeIndex>,
}

impl ArtifactGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered artifacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Register an artifact and return its handle.
    ///
    /// Registering a descriptor identical to one already present returns the
    /// existing handle.
    ///
    /// # Errors
    /// - `EmptyName` if the name is blank
    /// - `UnknownInput` if an input handle did not come from this builder
    /// - `DuplicateInput` if an input is listed twice
    /// - `Conflict` if the name and kind are taken by a different descriptor
    pub fn register(&mut self, spec: ArtifactSpec) -> Result<ArtifactHandle, ArtifactError> {
        if spec.name.trim().is_empty() {
            return Err(ArtifactError::EmptyName);
        }

        let mut input_nodes = Vec::with_capacity(spec.inputs.len());
        for input in &spec.inputs {
            let node = self
                .resolve(input)
                .ok_or_else(|| ArtifactError::UnknownInput {
                    name: input.name().to_string(),
                })?;
            if input_nodes.contains(&node) {
                return Err(ArtifactError::DuplicateInput {
                    name: input.name().to_string(),
                });
            }
            input_nodes.push(node);
        }

        let descriptor = ArtifactDescriptor::from_spec(spec);

        if let Some(&existing) = self.index.get(&descriptor.key) {
            let current = &self.graph[existing];
            if current.hash == descriptor.hash {
                tracing::debug!(artifact = %descriptor.key, "artifact already registered");
                return Ok(current.handle());
            }
            return Err(ArtifactError::Conflict {
                name: descriptor.key.name,
                kind: descriptor.key.kind,
            });
        }

        let handle = descriptor.handle();
        let key = descriptor.key.clone();
        let inputs = input_nodes.len();
        let node = self.graph.add_node(descriptor);
        for input in input_nodes {
            self.graph.add_edge(input, node, ());
        }
        self.index.insert(key, node);

        tracing::debug!(artifact = %handle, inputs, "registered artifact");
        Ok(handle)
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> ArtifactGraph {
        debug_assert!(!petgraph::algo::is_cyclic_directed(&self.graph));
        ArtifactGraph {
            graph: self.graph,
            index: self.index,
        }
    }

    fn resolve(&self, handle: &ArtifactHandle) -> Option<NodeIndex> {
        let node = *self.index.get(handle.key())?;
        (self.graph[node].hash == *handle.hash()).then_some(node)
    }
}

/// Immutable artifact DAG
#[derive(Debug, Clone)]
pub struct ArtifactGraph {
    graph: DiGraph<ArtifactDescriptor, ()>,
    index: IndexMap<ArtifactKey, NodeIndex>,
}

impl ArtifactGraph {
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `handle` refers to an artifact of this graph
    #[must_use]
    pub fn contains(&self, handle: &ArtifactHandle) -> bool {
        self.node(handle).is_some()
    }

    #[must_use]
    pub fn get(&self, handle: &ArtifactHandle) -> Option<&ArtifactDescriptor> {
        self.node(handle).map(|n| &self.graph[n])
    }

    #[must_use]
    pub fn lookup(&self, name: &str, kind: ArtifactKind) -> Option<&ArtifactDescriptor> {
        self.index
            .get(&ArtifactKey::new(name, kind))
            .map(|&n| &self.graph[n])
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ArtifactDescriptor> + '_ {
        self.index.values().map(move |&n| &self.graph[n])
    }

    /// Inputs come before the artifacts built from them; ties keep
    /// registration order.
    #[must_use]
    pub fn build_order(&self) -> Vec<&ArtifactDescriptor> {
        self.descriptors().collect()
    }

    /// Direct inputs in declaration order
    #[must_use]
    pub fn inputs_of(&self, handle: &ArtifactHandle) -> Vec<&ArtifactDescriptor> {
        self.get(handle)
            .map(|d| d.inputs.iter().filter_map(|i| self.get(i)).collect())
            .unwrap_or_default()
    }

    /// Every artifact `handle` transitively depends on, in build order
    #[must_use]
    pub fn dependencies_of(&self, handle: &ArtifactHandle) -> Vec<&ArtifactDescriptor> {
        let Some(start) = self.node(handle) else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(reversed) {
            if node != start {
                found.push(node);
            }
        }
        // Node indices follow registration order.
        found.sort_unstable();
        found.into_iter().map(|n| &self.graph[n]).collect()
    }

    /// Serialisable snapshot of every descriptor in build order
    #[must_use]
    pub fn manifest(&self) -> ArtifactManifest {
        ArtifactManifest {
            artifacts: self.descriptors().cloned().collect(),
        }
    }

    fn node(&self, handle: &ArtifactHandle) -> Option<NodeIndex> {
        let node = *self.index.get(handle.key())?;
        (self.graph[node].hash == *handle.hash()).then_some(node)
    }
}

/// Artifact listing written by `sweep-launcher artifacts --json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub artifacts: Vec<ArtifactDescriptor>,
}
