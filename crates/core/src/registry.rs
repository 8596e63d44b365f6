//! Static mapping from producer name to its expected deliverables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier for one expected deliverable (typically a relative
/// path under the artifact root). Checked for presence only, never content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocator(String);

impl ArtifactLocator {
    /// Wraps a locator string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrows the locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArtifactLocator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named producer and the ordered list of artifacts it is expected to
/// create. Immutable for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerTask {
    /// Unique producer name.
    pub name: String,
    /// Expected artifacts, in registration order.
    pub artifacts: Vec<ArtifactLocator>,
}

/// Registration-time errors. These are fatal to setup and must be
/// surfaced before the scheduler starts.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A producer with this name was already registered.
    #[error("duplicate producer: {0}")]
    DuplicateProducer(String),

    /// A producer must expect at least one artifact.
    #[error("producer {0} has an empty artifact list")]
    EmptyArtifactList(String),
}

/// Insertion-ordered collection of [`ProducerTask`]s.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    producers: Vec<ProducerTask>,
}

impl ArtifactRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a producer with its expected artifacts.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        artifacts: Vec<ArtifactLocator>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.producers.iter().any(|p| p.name == name) {
            return Err(RegistryError::DuplicateProducer(name));
        }
        if artifacts.is_empty() {
            return Err(RegistryError::EmptyArtifactList(name));
        }
        self.producers.push(ProducerTask { name, artifacts });
        Ok(())
    }

    /// All registered producers, in registration order.
    pub fn list(&self) -> &[ProducerTask] {
        &self.producers
    }

    /// Number of registered producers.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// True if no producer is registered.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}
