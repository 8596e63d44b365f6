use std::path::PathBuf;

use anyhow::Context;
use monitor_core::progress::ArtifactProbe;
use monitor_core::registry::ArtifactLocator;

/// Filesystem presence check: a locator is a path relative to the
/// artifact root (absolute locators are used as-is).
pub struct FsProbe {
    root: PathBuf,
}

impl FsProbe {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ArtifactProbe for FsProbe {
    fn exists(&self, locator: &ArtifactLocator) -> anyhow::Result<bool> {
        let path = self.root.join(locator.as_str());
        match std::fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
        }
    }
}
