//! Artifact descriptors
//!
//! An artifact is a provenance-tracked build output or resource: a repository
//! checkout, a compiled binary, a disk image or a kernel. Registration turns an
//! [`ArtifactSpec`] into an immutable [`ArtifactDescriptor`] and hands back an
//! [`ArtifactHandle`] that later stands in for the artifact as a dependency.

use crate::error::ArtifactError;
use crate::hash::{ContentHash, ProvenanceHasher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of artifact, serialised with the same type tags the artifact
/// database uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    #[serde(rename = "git repo")]
    GitRepo,
    #[serde(rename = "gem5 binary")]
    SimulatorBinary,
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "disk image")]
    DiskImage,
    #[serde(rename = "kernel")]
    Kernel,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::GitRepo,
        ArtifactKind::SimulatorBinary,
        ArtifactKind::Binary,
        ArtifactKind::DiskImage,
        ArtifactKind::Kernel,
    ];

    /// Stable type tag
    #[inline]
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            ArtifactKind::GitRepo => "git repo",
            ArtifactKind::SimulatorBinary => "gem5 binary",
            ArtifactKind::Binary => "binary",
            ArtifactKind::DiskImage => "disk image",
            ArtifactKind::Kernel => "kernel",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ArtifactKind {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| ArtifactError::UnknownKind(s.to_string()))
    }
}

/// Identity of an artifact: name plus kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub name: String,
    pub kind: ArtifactKind,
}

impl ArtifactKey {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Opaque reference to a registered artifact
///
/// Cheap to clone; carries the provenance hash so that a handle from one
/// registry is never mistaken for a same-named artifact in another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactHandle {
    key: ArtifactKey,
    hash: ContentHash,
}

impl ArtifactHandle {
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.key.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.key.kind
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.key, self.hash.short())
    }
}

/// Registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub kind: ArtifactKind,
    pub command: String,
    pub path: String,
    pub cwd: String,
    pub inputs: Vec<ArtifactHandle>,
    pub documentation: String,
}

impl ArtifactSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
            command: String::new(),
            path: String::new(),
            cwd: "./".to_string(),
            inputs: Vec::new(),
            documentation: String::new(),
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: &ArtifactHandle) -> Self {
        self.inputs.push(input.clone());
        self
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

/// Immutable registered artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub key: ArtifactKey,
    pub command: String,
    pub path: String,
    pub cwd: String,
    pub inputs: Vec<ArtifactHandle>,
    pub documentation: String,
    pub hash: ContentHash,
}

impl ArtifactDescriptor {
    /// Normalise text fields and compute the provenance hash.
    ///
    /// Documentation is excluded from the hash: rewording it does not change
    /// what was built.
    #[must_use]
    pub(crate) fn from_spec(spec: ArtifactSpec) -> Self {
        let command = normalize_text(&spec.command);
        let documentation = normalize_text(&spec.documentation);

        let mut hasher = ProvenanceHasher::new();
        hasher
            .field(spec.kind.tag())
            .field(&spec.name)
            .field(&command)
            .field(&spec.path)
            .field(&spec.cwd);
        for input in &spec.inputs {
            hasher.hash(input.hash());
        }

        Self {
            key: ArtifactKey::new(spec.name, spec.kind),
            command,
            path: spec.path,
            cwd: spec.cwd,
            inputs: spec.inputs,
            documentation,
            hash: hasher.finish(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> ArtifactHandle {
        ArtifactHandle {
            key: self.key.clone(),
            hash: self.hash,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.key.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.key.kind
    }
}

/// Strip the indentation common to all non-blank lines, trailing whitespace
/// and surrounding blank lines.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let body: Vec<&str> = lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .skip_while(|l| l.is_empty())
        .collect();
    let end = body.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
    body[..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_round_trip() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.tag().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!(matches!(
            "tarball".parse::<ArtifactKind>(),
            Err(ArtifactError::UnknownKind(_))
        ));
    }

    #[test]
    fn kind_serde_matches_tag() {
        let json = serde_json::to_string(&ArtifactKind::DiskImage).unwrap();
        assert_eq!(json, "\"disk image\"");
    }

    #[test]
    fn normalize_strips_common_indent() {
        let text = "
            git clone https://example.org/gem5
            cd gem5
                scons build/X86/gem5.opt
        ";
        assert_eq!(
            normalize_text(text),
            "git clone https://example.org/gem5\ncd gem5\n    scons build/X86/gem5.opt"
        );
    }

    #[test]
    fn normalize_single_line() {
        assert_eq!(normalize_text("  scons -j8  "), "scons -j8");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("\n   \n"), "");
    }

    #[test]
    fn documentation_does_not_affect_hash() {
        let a = ArtifactSpec::new("gem5", ArtifactKind::GitRepo)
            .with_command("git clone gem5")
            .with_documentation("first wording");
        let b = a.clone().with_documentation("second wording");
        assert_eq!(
            ArtifactDescriptor::from_spec(a).hash,
            ArtifactDescriptor::from_spec(b).hash
        );
    }

    #[test]
    fn indentation_does_not_affect_hash() {
        let a = ArtifactSpec::new("gem5", ArtifactKind::GitRepo).with_command("git clone gem5");
        let b = a.clone().with_command("\n        git clone gem5\n    ");
        assert_eq!(
            ArtifactDescriptor::from_spec(a).hash,
            ArtifactDescriptor::from_spec(b).hash
        );
    }

    #[test]
    fn path_affects_hash() {
        let a = ArtifactSpec::new("m5", ArtifactKind::Binary).with_path("a/m5");
        let b = a.clone().with_path("b/m5");
        assert_ne!(
            ArtifactDescriptor::from_spec(a).hash,
            ArtifactDescriptor::from_spec(b).hash
        );
    }
}
