use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::core::{NamespaceRoutes, RoutingTable};
use crate::compiler::{ActionCompiler, CompileSettings, CompiledAction};
use crate::config::{PackageConfig, PackageSet};
use crate::error::{CompilationError, ConfigError};
use crate::matcher::PatternMatcherBuilder;
use crate::resolver::{resolve_package_defaults, PackageDefaults};

#[derive(Default)]
struct NamespaceDraft {
    actions: IndexMap<String, Arc<CompiledAction>>,
    default_action: Option<String>,
    /// First package that contributed to the namespace
    package: String,
}

/// Compile every concrete package in `packages` into a new [`RoutingTable`].
///
/// Failures are collected, not fatal: a package whose inheritance cannot be resolved is
/// skipped, and an action that fails to compile is left out of the table. Every action in the
/// returned table compiled cleanly.
#[must_use]
pub fn build_routing_table(
    packages: &PackageSet,
    settings: &CompileSettings,
    generation: u64,
) -> (RoutingTable, Vec<CompilationError>) {
    let compiler = ActionCompiler::new(settings);
    let mut errors = Vec::new();
    let mut resolved: HashMap<String, Result<PackageDefaults, ConfigError>> = HashMap::new();
    let mut drafts: IndexMap<String, NamespaceDraft> = IndexMap::new();

    for (name, package) in packages {
        if package.is_abstract {
            continue;
        }
        let defaults = match defaults_for(package, packages, &mut resolved) {
            Ok(d) => d,
            Err(e) => {
                errors.push(CompilationError::package(name.clone(), e));
                continue;
            }
        };

        let mut compiled = Vec::with_capacity(defaults.actions.len());
        for (action_name, action) in &defaults.actions {
            let result = if action.package_name.is_empty() || action.package_name == *name {
                compiler.compile(action, &defaults)
            } else {
                // inherited: the declaring package's global results apply
                let declaring = packages
                    .get(action.package_name.as_str())
                    .and_then(|p| defaults_for(p, packages, &mut resolved).ok());
                match declaring {
                    Some(d) => compiler.compile_with_globals(action, &defaults, &d.global_results),
                    None => compiler.compile(action, &defaults),
                }
            };
            match result {
                Ok(a) => compiled.push((action_name.clone(), Arc::new(a))),
                Err(e) => {
                    warn!(
                        package = %name,
                        action = %action_name,
                        error_kind = e.kind(),
                        error = %e,
                        "Action excluded from routing table"
                    );
                    errors.push(CompilationError::action(name.clone(), action_name.clone(), e));
                }
            }
        }

        let draft = drafts
            .entry(package.namespace.clone())
            .or_insert_with(|| NamespaceDraft {
                package: name.clone(),
                ..NamespaceDraft::default()
            });
        draft.actions.extend(compiled);
        if let Some(default_action) = &defaults.default_action_ref {
            draft.default_action = Some(default_action.clone());
        }
    }

    let mut namespace_builder = PatternMatcherBuilder::new(false);
    let mut namespaces = IndexMap::with_capacity(drafts.len());
    for (namespace, draft) in drafts {
        if let Err(e) = namespace_builder.add(&namespace, namespace.clone()) {
            errors.push(CompilationError::package(draft.package.clone(), e));
        }

        let mut action_builder = PatternMatcherBuilder::new(true);
        for (action_name, action) in &draft.actions {
            if let Err(e) = action_builder.add(action_name, Arc::clone(action)) {
                errors.push(CompilationError::action(
                    action.package_name.clone(),
                    action_name.clone(),
                    e,
                ));
            }
        }

        namespaces.insert(
            namespace,
            NamespaceRoutes {
                actions: draft.actions,
                default_action: draft.default_action,
                patterns: action_builder.build(),
            },
        );
    }

    let table = RoutingTable {
        namespaces,
        namespace_patterns: namespace_builder.build(),
        generation,
    };

    let summary: Vec<String> = table
        .namespaces()
        .take(10)
        .map(|ns| format!("{ns:?}"))
        .collect();
    info!(
        generation,
        namespaces_count = table.namespaces.len(),
        actions_count = table.action_count(),
        namespace_summary = ?summary,
        errors = errors.len(),
        "Routing table built"
    );

    (table, errors)
}

/// Resolved defaults for `package`, computed once per build.
fn defaults_for(
    package: &PackageConfig,
    packages: &PackageSet,
    cache: &mut HashMap<String, Result<PackageDefaults, ConfigError>>,
) -> Result<PackageDefaults, ConfigError> {
    if let Some(cached) = cache.get(&package.name) {
        return cached.clone();
    }
    let resolved = resolve_package_defaults(package, packages);
    cache.insert(package.name.clone(), resolved.clone());
    resolved
}
