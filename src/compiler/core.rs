use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{
    ActionConfig, ExceptionMappingConfig, InterceptorRef, Location, Params, ResultConfig,
};
use crate::error::ConfigError;
use crate::matcher::{is_literal, substitute, WildcardPattern};
use crate::resolver::{expand_interceptor_refs, InterceptorMapping, PackageDefaults};

/// Method-name regex applied when neither the action nor the system configures one.
pub const DEFAULT_METHOD_REGEX: &str = "([A-Za-z0-9_$]*)";

static DEFAULT_METHOD_PATTERN: Lazy<Result<Regex, ConfigError>> =
    Lazy::new(|| anchored(DEFAULT_METHOD_REGEX));

/// Method invoked when an action declares none.
pub const DEFAULT_METHOD: &str = "execute";

/// System-wide compilation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSettings {
    /// Replaces [`DEFAULT_METHOD_REGEX`] for actions without their own override.
    pub method_regex: Option<String>,
}

impl CompileSettings {
    /// Check that the system method regex compiles.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] for a regex that does not compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.method_regex.as_deref() {
            Some(source) => anchored(source).map(|_| ()),
            None => Ok(()),
        }
    }
}

/// A result with its implementation resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledResult {
    pub name: String,
    /// Never empty in a published table.
    pub class_name: String,
    pub params: Params,
}

/// Method names an action may be invoked with when strict method invocation is on.
///
/// Entries may contain `*` wildcards; `{n}` placeholders are substituted when the owning
/// action is matched through a wildcard name.
#[derive(Debug, Clone, Default)]
pub struct AllowedMethods {
    declared: Vec<String>,
    patterns: Vec<WildcardPattern>,
}

impl AllowedMethods {
    pub fn new(declared: Vec<String>) -> Self {
        let mut patterns = Vec::new();
        for method in declared.iter().filter(|m| !is_literal(m)) {
            match WildcardPattern::compile(method) {
                Ok(p) => patterns.push(p),
                Err(e) => warn!(method = %method, error = %e, "Ignoring allowed-method pattern"),
            }
        }
        Self { declared, patterns }
    }

    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.declared.iter().any(|m| m == method)
            || self.patterns.iter().any(|p| p.captures(method).is_some())
    }

    /// Entries as declared.
    #[must_use]
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    fn substituted(&self, captures: &[String]) -> Self {
        Self::new(
            self.declared
                .iter()
                .map(|m| substitute(m, captures))
                .collect(),
        )
    }
}

impl PartialEq for AllowedMethods {
    fn eq(&self, other: &Self) -> bool {
        self.declared == other.declared
    }
}

/// Immutable, fully resolved configuration of one routable action.
#[derive(Debug, Clone)]
pub struct CompiledAction {
    pub package_name: String,
    pub namespace: String,
    pub name: String,
    /// Action class, else the package default class.
    pub class_name: Option<String>,
    pub method: Option<String>,
    pub params: Params,
    pub results: IndexMap<String, CompiledResult>,
    /// Execution order.
    pub interceptors: Vec<InterceptorMapping>,
    /// Package-level mappings followed by action-level mappings.
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    pub strict_method_invocation: bool,
    pub allowed_methods: AllowedMethods,
    pub location: Option<Location>,
    action_mappings_start: usize,
    method_regex_source: String,
    method_regex: Regex,
}

impl PartialEq for CompiledAction {
    fn eq(&self, other: &Self) -> bool {
        self.package_name == other.package_name
            && self.namespace == other.namespace
            && self.name == other.name
            && self.class_name == other.class_name
            && self.method == other.method
            && self.params == other.params
            && self.results == other.results
            && self.interceptors == other.interceptors
            && self.exception_mappings == other.exception_mappings
            && self.strict_method_invocation == other.strict_method_invocation
            && self.allowed_methods == other.allowed_methods
            && self.location == other.location
            && self.method_regex_source == other.method_regex_source
    }
}

impl CompiledAction {
    /// Configured method, defaulting to `execute`.
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_METHOD)
    }

    #[must_use]
    pub fn result(&self, name: &str) -> Option<&CompiledResult> {
        self.results.get(name)
    }

    /// The method-name regex as configured (unanchored).
    #[must_use]
    pub fn method_regex(&self) -> &str {
        &self.method_regex_source
    }

    /// Mapping for `exception`; action-level mappings are consulted before package-level ones.
    #[must_use]
    pub fn find_exception_mapping(&self, exception: &str) -> Option<&ExceptionMappingConfig> {
        let (package, action) = self.exception_mappings.split_at(self.action_mappings_start);
        action
            .iter()
            .chain(package.iter())
            .find(|m| m.exception == exception)
    }

    /// Whether `method` may be invoked on this action.
    ///
    /// The configured method is always allowed. Otherwise strict actions require the method
    /// to be listed in [`allowed_methods`](Self::allowed_methods) and non-strict actions require
    /// a full match of the method regex.
    #[must_use]
    pub fn is_allowed_method(&self, method: &str) -> bool {
        if method == self.method_name() {
            return true;
        }
        if self.strict_method_invocation {
            self.allowed_methods.contains(method)
        } else {
            self.method_regex.is_match(method)
        }
    }

    /// Copy with `{n}` placeholders replaced by `captures` in the class name, method,
    /// params, result params and allowed methods.
    #[must_use]
    pub fn substituted(&self, captures: &[String]) -> Self {
        let mut out = self.clone();
        out.class_name = self.class_name.as_deref().map(|c| substitute(c, captures));
        out.method = self.method.as_deref().map(|m| substitute(m, captures));
        for value in out.params.values_mut() {
            *value = substitute(value, captures);
        }
        for result in out.results.values_mut() {
            for value in result.params.values_mut() {
                *value = substitute(value, captures);
            }
        }
        out.allowed_methods = self.allowed_methods.substituted(captures);
        out
    }

    /// Copy whose params also contain `extra`. Existing keys are overwritten.
    #[must_use]
    pub fn with_params<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut out = self.clone();
        out.params.extend(extra);
        out
    }
}

fn anchored(source: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{source})$")).map_err(|e| ConfigError::InvalidPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

/// Combines action descriptors with their package's resolved defaults.
///
/// Compilation is pure: the same descriptor and defaults always yield the same
/// [`CompiledAction`], and nothing is registered or cached outside the returned value.
#[derive(Debug, Clone)]
pub struct ActionCompiler {
    system_regex_source: String,
    system_regex: Result<Regex, ConfigError>,
}

impl ActionCompiler {
    #[must_use]
    pub fn new(settings: &CompileSettings) -> Self {
        match settings.method_regex.as_deref() {
            Some(source) => Self {
                system_regex_source: source.to_string(),
                system_regex: anchored(source),
            },
            None => Self {
                system_regex_source: DEFAULT_METHOD_REGEX.to_string(),
                system_regex: DEFAULT_METHOD_PATTERN.clone(),
            },
        }
    }

    /// Compile `action` for the package described by `defaults`, using that package's
    /// global results.
    pub fn compile(
        &self,
        action: &ActionConfig,
        defaults: &PackageDefaults,
    ) -> Result<CompiledAction, ConfigError> {
        self.compile_with_globals(action, defaults, &defaults.global_results)
    }

    /// Compile `action` for the package described by `defaults`.
    ///
    /// `globals` are the global results of the package that declared the action, which
    /// differs from `defaults` when the action is inherited from an ancestor.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnresolvedDefault`] when a result has no class and no resolvable type
    /// - [`ConfigError::UnknownInterceptor`] / [`ConfigError::CyclicInheritance`] from the
    ///   interceptor chain
    /// - [`ConfigError::InvalidPattern`] for a bad method regex
    pub fn compile_with_globals(
        &self,
        action: &ActionConfig,
        defaults: &PackageDefaults,
        globals: &IndexMap<String, ResultConfig>,
    ) -> Result<CompiledAction, ConfigError> {
        let mut merged: IndexMap<String, ResultConfig> = globals.clone();
        for (name, result) in &action.results {
            merged.insert(name.clone(), result.clone());
        }
        let mut results = IndexMap::with_capacity(merged.len());
        for (name, result) in merged {
            let compiled = resolve_result(result, &action.name, defaults)?;
            results.insert(name, compiled);
        }

        let interceptors = if !action.interceptor_refs.is_empty() {
            expand_interceptor_refs(&action.interceptor_refs, defaults)?
        } else if let Some(default_ref) = defaults.default_interceptor_ref.as_deref() {
            expand_interceptor_refs(&[InterceptorRef::new(default_ref)], defaults)?
        } else {
            Vec::new()
        };

        let (method_regex_source, method_regex) = match action.method_regex.as_deref() {
            Some(own) => (own.to_string(), anchored(own)?),
            None => (
                self.system_regex_source.clone(),
                self.system_regex.clone()?,
            ),
        };

        let mut exception_mappings: Vec<ExceptionMappingConfig> =
            defaults.exception_mappings.values().cloned().collect();
        let action_mappings_start = exception_mappings.len();
        exception_mappings.extend(action.exception_mappings.iter().cloned());

        let mut allowed = defaults.global_allowed_methods.clone();
        for method in &action.allowed_methods {
            if !allowed.contains(method) {
                allowed.push(method.clone());
            }
        }

        debug!(
            package = %defaults.name,
            action = %action.name,
            results = results.len(),
            interceptors = interceptors.len(),
            "Compiled action"
        );

        Ok(CompiledAction {
            package_name: defaults.name.clone(),
            namespace: defaults.namespace.clone(),
            name: action.name.clone(),
            class_name: action
                .class_name
                .clone()
                .or_else(|| defaults.default_class_ref.clone()),
            method: action.method.clone(),
            params: action.params.clone(),
            results,
            interceptors,
            exception_mappings,
            strict_method_invocation: defaults.strict_method_invocation,
            allowed_methods: AllowedMethods::new(allowed),
            location: action.location.clone(),
            action_mappings_start,
            method_regex_source,
            method_regex,
        })
    }
}

/// Fill in a result's implementation from its type, or the package default type.
fn resolve_result(
    result: ResultConfig,
    action: &str,
    defaults: &PackageDefaults,
) -> Result<CompiledResult, ConfigError> {
    let unresolved = |reason: String| ConfigError::UnresolvedDefault {
        package: defaults.name.clone(),
        action: action.to_string(),
        result: result.name.clone(),
        reason,
    };

    if let Some(class_name) = result.class_name.as_deref().filter(|c| !c.is_empty()) {
        return Ok(CompiledResult {
            name: result.name.clone(),
            class_name: class_name.to_string(),
            params: result.params.clone(),
        });
    }

    let type_name = match result
        .result_type
        .as_deref()
        .or(defaults.default_result_type.as_deref())
    {
        Some(t) => t,
        None => {
            return Err(unresolved(
                "no result type given and the package has no default result type".to_string(),
            ))
        }
    };
    let Some(result_type) = defaults.result_types.get(type_name) else {
        return Err(unresolved(format!("result type '{type_name}' is not declared")));
    };
    if result_type.class_name.is_empty() {
        return Err(unresolved(format!(
            "result type '{type_name}' has no implementation class"
        )));
    }

    let mut params = result_type.params.clone();
    params.extend(result.params.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(CompiledResult {
        name: result.name.clone(),
        class_name: result_type.class_name.clone(),
        params,
    })
}
