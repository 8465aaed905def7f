use indexmap::IndexMap;

use crate::config::{
    ActionConfig, ExceptionMappingConfig, InterceptorConfig, InterceptorStackConfig, Location,
    PackageConfig, PackageSet, ResultConfig, ResultTypeConfig,
};
use crate::error::{ConfigError, CycleKind};

/// Strict method invocation applies when no package in the chain sets it.
pub const DEFAULT_STRICT_METHOD_INVOCATION: bool = true;

/// Effective configuration of a package after merging its ancestor chain.
#[derive(Debug, Clone)]
pub struct PackageDefaults {
    pub name: String,
    pub namespace: String,
    pub location: Option<Location>,
    /// The package followed by its ancestors, nearest first.
    pub chain: Vec<String>,
    pub default_class_ref: Option<String>,
    pub default_action_ref: Option<String>,
    pub default_result_type: Option<String>,
    pub default_interceptor_ref: Option<String>,
    pub strict_method_invocation: bool,
    pub result_types: IndexMap<String, ResultTypeConfig>,
    pub global_results: IndexMap<String, ResultConfig>,
    pub interceptors: IndexMap<String, InterceptorConfig>,
    pub interceptor_stacks: IndexMap<String, InterceptorStackConfig>,
    pub global_allowed_methods: Vec<String>,
    pub exception_mappings: IndexMap<String, ExceptionMappingConfig>,
    /// Own and inherited actions; routable when the package is concrete.
    pub actions: IndexMap<String, ActionConfig>,
}

impl PackageDefaults {
    fn empty(package: &PackageConfig) -> Self {
        Self {
            name: package.name.clone(),
            namespace: package.namespace.clone(),
            location: package.location.clone(),
            chain: Vec::new(),
            default_class_ref: None,
            default_action_ref: None,
            default_result_type: None,
            default_interceptor_ref: None,
            strict_method_invocation: DEFAULT_STRICT_METHOD_INVOCATION,
            result_types: IndexMap::new(),
            global_results: IndexMap::new(),
            interceptors: IndexMap::new(),
            interceptor_stacks: IndexMap::new(),
            global_allowed_methods: Vec::new(),
            exception_mappings: IndexMap::new(),
            actions: IndexMap::new(),
        }
    }

    /// Layer `pkg` over what has been merged so far (ancestors first).
    fn apply(&mut self, pkg: &PackageConfig) {
        override_with(&mut self.default_class_ref, &pkg.default_class_ref);
        override_with(&mut self.default_action_ref, &pkg.default_action_ref);
        override_with(&mut self.default_result_type, &pkg.default_result_type);
        override_with(&mut self.default_interceptor_ref, &pkg.default_interceptor_ref);
        if let Some(strict) = pkg.strict_method_invocation {
            self.strict_method_invocation = strict;
        }

        extend_named(&mut self.result_types, &pkg.result_types);
        extend_named(&mut self.global_results, &pkg.global_results);
        extend_named(&mut self.interceptors, &pkg.interceptors);
        extend_named(&mut self.interceptor_stacks, &pkg.interceptor_stacks);
        extend_named(&mut self.actions, &pkg.actions);
        for mapping in &pkg.exception_mappings {
            self.exception_mappings
                .insert(mapping.name.clone(), mapping.clone());
        }
        for method in &pkg.global_allowed_methods {
            if !self.global_allowed_methods.contains(method) {
                self.global_allowed_methods.push(method.clone());
            }
        }
    }
}

fn override_with(slot: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

fn extend_named<V: Clone>(into: &mut IndexMap<String, V>, from: &IndexMap<String, V>) {
    for (name, value) in from {
        into.insert(name.clone(), value.clone());
    }
}

/// Merge `package` with its ancestors found in `packages`.
///
/// # Errors
///
/// - [`ConfigError::UnknownParentPackage`] if any parent in the chain is not registered
/// - [`ConfigError::CyclicInheritance`] if the chain revisits a package
pub fn resolve_package_defaults(
    package: &PackageConfig,
    packages: &PackageSet,
) -> Result<PackageDefaults, ConfigError> {
    let mut lineage: Vec<&PackageConfig> = vec![package];
    let mut current = package;

    while let Some(parent_name) = current.parent.as_deref() {
        if lineage.iter().any(|p| p.name == parent_name) {
            let mut chain: Vec<String> = lineage.iter().map(|p| p.name.clone()).collect();
            chain.push(parent_name.to_string());
            return Err(ConfigError::CyclicInheritance {
                kind: CycleKind::PackageParent,
                chain,
            });
        }
        let parent = packages
            .get(parent_name)
            .ok_or_else(|| ConfigError::UnknownParentPackage {
                package: current.name.clone(),
                parent: parent_name.to_string(),
            })?;
        lineage.push(parent);
        current = parent;
    }

    let mut defaults = PackageDefaults::empty(package);
    defaults.chain = lineage.iter().map(|p| p.name.clone()).collect();
    for pkg in lineage.iter().rev() {
        defaults.apply(pkg);
    }
    Ok(defaults)
}
