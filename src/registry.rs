//! # Registry Module
//!
//! [`ConfigurationRegistry`] owns the registered package descriptors and publishes the
//! compiled [`RoutingTable`].
//!
//! ## Concurrency
//!
//! - Lookups ([`resolve`](ConfigurationRegistry::resolve), [`table`](ConfigurationRegistry::table))
//!   read the published table through an [`ArcSwap`] and never block.
//! - Registration, removal and rebuilds serialize on one mutex guarding the package set.
//! - A rebuild compiles a complete new table off to the side, then publishes it with a single
//!   pointer store. A concurrent reader observes either the previous table or the new one.
//!
//! ## Example
//!
//! ```rust
//! use actionroute::config::{ActionConfig, PackageConfig};
//! use actionroute::registry::ConfigurationRegistry;
//!
//! let registry = ConfigurationRegistry::default();
//! let report = registry
//!     .rebuild(vec![PackageConfig::new("shop")
//!         .namespace("/shop")
//!         .action(ActionConfig::new("cart").class("CartAction"))])
//!     .unwrap();
//! assert!(report.is_clean());
//!
//! let found = registry.resolve("/shop", "cart").unwrap();
//! assert_eq!(found.action.class_name.as_deref(), Some("CartAction"));
//! ```

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::compiler::CompileSettings;
use crate::config::{PackageConfig, PackageSet};
use crate::error::{CompilationError, ConfigError, RebuildFailure};
use crate::matcher::is_literal;
use crate::router::{build_routing_table, ActionMatch, RoutingTable};

/// Scope reported for errors in [`CompileSettings`] rather than in a package.
pub const SETTINGS_SCOPE: &str = "<settings>";

/// What a rebuild does when some packages or actions fail to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RebuildPolicy {
    /// Publish everything that compiled and report the rest.
    #[default]
    PartialSuccess,
    /// Keep the previous table and package set if anything failed.
    AllOrNothing,
}

impl FromStr for RebuildPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "partial" | "partial-success" => Ok(RebuildPolicy::PartialSuccess),
            "all-or-nothing" | "strict" => Ok(RebuildPolicy::AllOrNothing),
            other => Err(format!(
                "unknown rebuild policy '{other}' (expected partial-success or all-or-nothing)"
            )),
        }
    }
}

impl fmt::Display for RebuildPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildPolicy::PartialSuccess => f.write_str("partial-success"),
            RebuildPolicy::AllOrNothing => f.write_str("all-or-nothing"),
        }
    }
}

/// Outcome of a rebuild that published a table.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    /// The table now being served
    pub table: Arc<RoutingTable>,
    /// Packages and actions left out of `table`
    pub errors: Vec<CompilationError>,
}

impl RebuildReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Registered packages plus the routing table compiled from them.
///
/// Shared between request threads and reloaders behind an `Arc`.
pub struct ConfigurationRegistry {
    packages: Mutex<PackageSet>,
    table: ArcSwap<RoutingTable>,
    settings: CompileSettings,
    policy: RebuildPolicy,
}

impl Default for ConfigurationRegistry {
    fn default() -> Self {
        Self::new(CompileSettings::default(), RebuildPolicy::default())
    }
}

impl fmt::Debug for ConfigurationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRegistry")
            .field("packages", &self.package_names())
            .field("generation", &self.table.load().generation())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ConfigurationRegistry {
    /// Registry with no packages and an empty table.
    #[must_use]
    pub fn new(settings: CompileSettings, policy: RebuildPolicy) -> Self {
        Self {
            packages: Mutex::new(PackageSet::new()),
            table: ArcSwap::from_pointee(RoutingTable::empty()),
            settings,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    #[must_use]
    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// Add `package` to the registered set. The routing table is unchanged until the next
    /// rebuild.
    ///
    /// Registering a name again from the same (known) location replaces the earlier
    /// declaration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicatePackage`] when the name is registered from elsewhere
    /// - [`ConfigError::DuplicateNamespace`] when another concrete package owns the same
    ///   literal namespace
    pub fn register_package(&self, package: PackageConfig) -> Result<(), ConfigError> {
        let mut packages = self.packages.lock();
        register_into(&mut packages, package)
    }

    /// Remove a package by name. Takes effect at the next rebuild.
    pub fn remove_package(&self, name: &str) -> Option<Arc<PackageConfig>> {
        let removed = self.packages.lock().shift_remove(name);
        if removed.is_some() {
            debug!(package = %name, "Package removed");
        }
        removed
    }

    #[must_use]
    pub fn get_package(&self, name: &str) -> Option<Arc<PackageConfig>> {
        self.packages.lock().get(name).map(Arc::clone)
    }

    /// Registered package names in registration order.
    #[must_use]
    pub fn package_names(&self) -> Vec<String> {
        self.packages.lock().keys().cloned().collect()
    }

    /// Replace the registered set with `packages` and publish a new table.
    ///
    /// Packages are registered in order; a package rejected by the duplicate checks is
    /// reported and left out. Under [`RebuildPolicy::AllOrNothing`] any error leaves the
    /// previous package set and table in place.
    pub fn rebuild(&self, packages: Vec<PackageConfig>) -> Result<RebuildReport, RebuildFailure> {
        let mut current = self.packages.lock();

        let mut next = PackageSet::with_capacity(packages.len());
        let mut errors = Vec::new();
        for package in packages {
            let name = package.name.clone();
            if let Err(e) = register_into(&mut next, package) {
                warn!(package = %name, error_kind = e.kind(), error = %e, "Package rejected");
                errors.push(CompilationError::package(name, e));
            }
        }

        let report = self.publish(&next, errors)?;
        *current = next;
        Ok(report)
    }

    /// Recompile the currently registered packages and publish the result.
    pub fn rebuild_runtime(&self) -> Result<RebuildReport, RebuildFailure> {
        let current = self.packages.lock();
        self.publish(&current, Vec::new())
    }

    /// Compile `packages` and store the table unless the policy rejects it.
    /// Callers hold the package lock, so generations never race.
    fn publish(
        &self,
        packages: &PackageSet,
        mut errors: Vec<CompilationError>,
    ) -> Result<RebuildReport, RebuildFailure> {
        // a bad system regex would fail every action; keep the current table instead
        if let Err(e) = self.settings.validate() {
            error!(
                error_kind = e.kind(),
                error = %e,
                "Invalid compile settings; previous routing table kept"
            );
            return Err(RebuildFailure {
                errors: vec![CompilationError::package(SETTINGS_SCOPE, e)],
            });
        }

        let generation = self.table.load().generation() + 1;
        let (table, compile_errors) = build_routing_table(packages, &self.settings, generation);
        errors.extend(compile_errors);

        if self.policy == RebuildPolicy::AllOrNothing && !errors.is_empty() {
            error!(
                generation,
                errors = errors.len(),
                policy = %self.policy,
                "Rebuild rejected; previous routing table kept"
            );
            return Err(RebuildFailure { errors });
        }

        let table = Arc::new(table);
        self.table.store(Arc::clone(&table));
        if errors.is_empty() {
            info!(generation, packages = packages.len(), "Routing table published");
        } else {
            warn!(
                generation,
                packages = packages.len(),
                errors = errors.len(),
                "Routing table published with errors"
            );
        }
        Ok(RebuildReport { table, errors })
    }

    /// Resolve against the currently published table.
    #[must_use]
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<ActionMatch> {
        self.table.load().resolve(namespace, name)
    }

    /// The currently published table.
    #[must_use]
    pub fn table(&self) -> Arc<RoutingTable> {
        self.table.load_full()
    }

    /// Drop every package and publish an empty table.
    pub fn destroy(&self) {
        let mut packages = self.packages.lock();
        packages.clear();
        let generation = self.table.load().generation() + 1;
        self.table
            .store(Arc::new(RoutingTable::empty_at_generation(generation)));
        info!(generation, "Configuration registry destroyed");
    }
}

/// Duplicate checks shared by [`ConfigurationRegistry::register_package`] and rebuilds.
fn register_into(packages: &mut PackageSet, package: PackageConfig) -> Result<(), ConfigError> {
    if let Some(existing) = packages.get(&package.name) {
        if !same_location(existing, &package) {
            return Err(ConfigError::DuplicatePackage {
                name: package.name.clone(),
                existing: existing.location.clone(),
                incoming: package.location.clone(),
            });
        }
        debug!(
            package = %package.name,
            location = ?package.location,
            "Package re-registered from the same location"
        );
    }

    if !package.is_abstract && is_literal(&package.namespace) {
        let owner = packages.values().find(|other| {
            other.name != package.name
                && !other.is_abstract
                && other.namespace == package.namespace
                && !same_location(other, &package)
        });
        if let Some(owner) = owner {
            return Err(ConfigError::DuplicateNamespace {
                namespace: package.namespace.clone(),
                existing_package: owner.name.clone(),
                package: package.name.clone(),
            });
        }
    }

    debug!(
        package = %package.name,
        namespace = %package.namespace,
        actions = package.actions.len(),
        "Package registered"
    );
    packages.insert(package.name.clone(), Arc::new(package));
    Ok(())
}

fn same_location(a: &PackageConfig, b: &PackageConfig) -> bool {
    matches!((&a.location, &b.location), (Some(x), Some(y)) if x == y)
}
