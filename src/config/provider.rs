use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::load::load_packages;
use super::types::PackageConfig;

/// A source of package descriptors.
pub trait PackageProvider: Send {
    /// Produce the provider's current package descriptors.
    fn load_packages(&mut self) -> anyhow::Result<Vec<PackageConfig>>;

    /// Whether the underlying source changed since the last load.
    fn needs_reload(&self) -> bool {
        false
    }

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Loads packages from one YAML, JSON or TOML file and tracks its modification time.
#[derive(Debug, Clone)]
pub struct FilePackageProvider {
    path: PathBuf,
    loaded_at: Option<SystemTime>,
}

impl FilePackageProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded_at: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()
    }
}

impl PackageProvider for FilePackageProvider {
    fn load_packages(&mut self) -> anyhow::Result<Vec<PackageConfig>> {
        let stamp = self.modified();
        let packages = load_packages(&self.path)
            .with_context(|| format!("provider {} failed", self.describe()))?;
        self.loaded_at = stamp;
        Ok(packages)
    }

    /// True before the first load, and whenever the file's mtime differs from the one seen
    /// at the last successful load.
    fn needs_reload(&self) -> bool {
        match self.loaded_at {
            None => true,
            Some(seen) => self.modified().is_some_and(|now| now != seen),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Serves a fixed, in-memory list of packages.
#[derive(Debug, Clone, Default)]
pub struct StaticPackageProvider {
    packages: Vec<PackageConfig>,
    dirty: bool,
}

impl StaticPackageProvider {
    #[must_use]
    pub fn new(packages: Vec<PackageConfig>) -> Self {
        Self {
            packages,
            dirty: true,
        }
    }

    /// Replace the served packages; the provider reports `needs_reload` until next loaded.
    pub fn replace(&mut self, packages: Vec<PackageConfig>) {
        self.packages = packages;
        self.dirty = true;
    }
}

impl PackageProvider for StaticPackageProvider {
    fn load_packages(&mut self) -> anyhow::Result<Vec<PackageConfig>> {
        self.dirty = false;
        Ok(self.packages.clone())
    }

    fn needs_reload(&self) -> bool {
        self.dirty
    }

    fn describe(&self) -> String {
        format!("static:{} package(s)", self.packages.len())
    }
}
