//! # Hot Reload Module
//!
//! Live reloading of package configuration without restarting the process.
//!
//! ## Overview
//!
//! - [`watch_config`] watches one configuration file and rebuilds the registry whenever the
//!   file is modified or re-created
//! - [`reload_from_providers`] concatenates the output of several
//!   [`PackageProvider`]s and rebuilds from it
//! - [`reload_if_needed`] does the same only when a provider reports a change, for callers
//!   that poll instead of watching
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actionroute::hot_reload::watch_config;
//! use actionroute::registry::ConfigurationRegistry;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = Arc::new(ConfigurationRegistry::default());
//! let _watcher = watch_config("conf/actions.yaml", Arc::clone(&registry), |report| {
//!     println!("generation {} live", report.table.generation());
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! The returned watcher stops watching when dropped.
//!
//! ## Error Handling
//!
//! If the changed file fails to load, or an all-or-nothing rebuild is rejected:
//! - The error is logged
//! - The previous routing table remains published
//! - Lookups continue against it

use anyhow::Context;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{load_packages, PackageProvider};
use crate::registry::{ConfigurationRegistry, RebuildReport};

/// Watch a configuration file and rebuild `registry` when it changes.
///
/// `on_reload` receives the report of every rebuild that published a table.
pub fn watch_config<P, F>(
    config_path: P,
    registry: Arc<ConfigurationRegistry>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&RebuildReport) + Send + 'static,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload_file(&watch_path, &registry) {
                        Ok(report) => {
                            info!(
                                path = %watch_path.display(),
                                generation = report.table.generation(),
                                actions = report.table.action_count(),
                                errors = report.errors.len(),
                                "hot-reload: applying configuration update"
                            );
                            on_reload(&report);
                        }
                        Err(e) => error!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: keeping previous routing table"
                        ),
                    }
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching configuration file");
    Ok(watcher)
}

/// Load `path` and rebuild `registry` from it.
pub fn reload_file(path: &Path, registry: &ConfigurationRegistry) -> anyhow::Result<RebuildReport> {
    let packages = load_packages(path)?;
    registry
        .rebuild(packages)
        .with_context(|| format!("rebuild from {} rejected", path.display()))
}

/// Load every provider in order and rebuild `registry` from the combined packages.
///
/// A provider that fails to load aborts the reload; nothing is rebuilt.
pub fn reload_from_providers(
    registry: &ConfigurationRegistry,
    providers: &mut [Box<dyn PackageProvider>],
) -> anyhow::Result<RebuildReport> {
    let mut packages = Vec::new();
    for provider in providers.iter_mut() {
        let loaded = provider.load_packages()?;
        info!(
            provider = %provider.describe(),
            packages = loaded.len(),
            "Loaded packages from provider"
        );
        packages.extend(loaded);
    }
    registry
        .rebuild(packages)
        .context("rebuild from providers rejected")
}

/// [`reload_from_providers`] when at least one provider reports a change, else `Ok(None)`.
pub fn reload_if_needed(
    registry: &ConfigurationRegistry,
    providers: &mut [Box<dyn PackageProvider>],
) -> anyhow::Result<Option<RebuildReport>> {
    if !providers.iter().any(|p| p.needs_reload()) {
        return Ok(None);
    }
    reload_from_providers(registry, providers).map(Some)
}
