use std::path::Path;

use anyhow::{Context, Result};
use monitor_core::registry::ArtifactRegistry;
use serde::{Deserialize, Serialize};

/// Monitor configuration: the expected deliverables per producer.
///
/// ```toml
/// [[producer]]
/// name = "backend-architect"
/// artifacts = ["backend/composer.json", "backend/public/index.php"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(rename = "producer")]
    pub producers: Vec<ProducerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerEntry {
    pub name: String,
    pub artifacts: Vec<String>,
}

impl MonitorConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: MonitorConfig =
            toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        if cfg.producers.is_empty() {
            anyhow::bail!("{} lists no producers", path.display());
        }
        Ok(cfg)
    }

    /// Builds the registry. Duplicate names and empty artifact lists are
    /// setup errors and reject the whole config.
    pub fn build_registry(&self) -> Result<ArtifactRegistry> {
        let mut registry = ArtifactRegistry::new();
        for entry in &self.producers {
            let artifacts = entry.artifacts.iter().map(|a| a.as_str().into()).collect();
            registry
                .register(&entry.name, artifacts)
                .with_context(|| format!("producer {}", entry.name))?;
        }
        Ok(registry)
    }
}
