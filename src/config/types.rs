use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

use crate::matcher::is_literal;

/// String parameters attached to actions, results and interceptors.
///
/// Ordered so that compiled actions compare and print deterministically.
pub type Params = BTreeMap<String, String>;

/// Where a descriptor was declared (e.g. `conf/app.yaml#packages[2]`).
///
/// Two declarations are "at the same location" when their locations are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named outcome of an action, rendered by some result implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultConfig {
    pub name: String,
    /// Implementation reference. `None` until a type or the package default fills it in.
    pub class_name: Option<String>,
    /// Result-type name resolved through the package's result types.
    pub result_type: Option<String>,
    pub params: Params,
}

impl ResultConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: None,
            result_type: None,
            params: Params::new(),
        }
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn of_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type = Some(result_type.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A named result implementation with default parameters (`dispatcher`, `redirect`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTypeConfig {
    pub name: String,
    pub class_name: String,
    pub params: Params,
}

impl ResultTypeConfig {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// An interceptor declaration: name, implementation and default parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorConfig {
    pub name: String,
    pub class_name: String,
    pub params: Params,
}

impl InterceptorConfig {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A binding to an interceptor or interceptor stack, by name.
///
/// When the binding names a stack, keys of the form `member.param` override the
/// parameters of the stack member called `member`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorRef {
    pub name: String,
    pub params: Params,
}

impl InterceptorRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// An ordered, named group of interceptor bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorStackConfig {
    pub name: String,
    pub refs: Vec<InterceptorRef>,
}

impl InterceptorStackConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            refs: Vec::new(),
        }
    }

    pub fn with(mut self, binding: InterceptorRef) -> Self {
        self.refs.push(binding);
        self
    }

    /// Shorthand for a parameterless binding.
    pub fn with_ref(self, name: impl Into<String>) -> Self {
        self.with(InterceptorRef::new(name))
    }
}

/// Maps an error name raised by an action to a result name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionMappingConfig {
    pub name: String,
    pub exception: String,
    pub result: String,
    pub params: Params,
}

impl ExceptionMappingConfig {
    pub fn new(
        name: impl Into<String>,
        exception: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            exception: exception.into(),
            result: result.into(),
            params: Params::new(),
        }
    }
}

/// Declared configuration of a single action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub name: String,
    /// Declaring package. Set by [`PackageConfig::action`].
    pub package_name: String,
    pub class_name: Option<String>,
    pub method: Option<String>,
    /// Execution order is declaration order.
    pub interceptor_refs: Vec<InterceptorRef>,
    pub results: IndexMap<String, ResultConfig>,
    pub params: Params,
    pub allowed_methods: Vec<String>,
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    /// Overrides the system method regex for this action.
    pub method_regex: Option<String>,
    pub location: Option<Location>,
}

impl ActionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_name: String::new(),
            class_name: None,
            method: None,
            interceptor_refs: Vec::new(),
            results: IndexMap::new(),
            params: Params::new(),
            allowed_methods: Vec::new(),
            exception_mappings: Vec::new(),
            method_regex: None,
            location: None,
        }
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn interceptor(mut self, binding: InterceptorRef) -> Self {
        self.interceptor_refs.push(binding);
        self
    }

    pub fn interceptor_ref(self, name: impl Into<String>) -> Self {
        self.interceptor(InterceptorRef::new(name))
    }

    pub fn result(mut self, result: ResultConfig) -> Self {
        self.results.insert(result.name.clone(), result);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn allowed_method(mut self, method: impl Into<String>) -> Self {
        self.allowed_methods.push(method.into());
        self
    }

    pub fn exception_mapping(mut self, mapping: ExceptionMappingConfig) -> Self {
        self.exception_mappings.push(mapping);
        self
    }

    pub fn method_regex(mut self, regex: impl Into<String>) -> Self {
        self.method_regex = Some(regex.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A named group of actions and defaults, optionally inheriting from a parent package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    pub name: String,
    pub namespace: String,
    /// Parent package name, resolved through the registry.
    pub parent: Option<String>,
    pub is_abstract: bool,
    pub actions: IndexMap<String, ActionConfig>,
    pub result_types: IndexMap<String, ResultTypeConfig>,
    pub global_results: IndexMap<String, ResultConfig>,
    pub interceptors: IndexMap<String, InterceptorConfig>,
    pub interceptor_stacks: IndexMap<String, InterceptorStackConfig>,
    pub default_class_ref: Option<String>,
    pub default_action_ref: Option<String>,
    /// Name of a result type, not an implementation class.
    pub default_result_type: Option<String>,
    /// Name of an interceptor or interceptor stack.
    pub default_interceptor_ref: Option<String>,
    /// `None` inherits from the parent chain.
    pub strict_method_invocation: Option<bool>,
    pub global_allowed_methods: Vec<String>,
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    pub location: Option<Location>,
}

impl PackageConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            parent: None,
            is_abstract: false,
            actions: IndexMap::new(),
            result_types: IndexMap::new(),
            global_results: IndexMap::new(),
            interceptors: IndexMap::new(),
            interceptor_stacks: IndexMap::new(),
            default_class_ref: None,
            default_action_ref: None,
            default_result_type: None,
            default_interceptor_ref: None,
            strict_method_invocation: None,
            global_allowed_methods: Vec::new(),
            exception_mappings: Vec::new(),
            location: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn abstract_package(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Add an action; the action's `package_name` is set to this package.
    pub fn action(mut self, mut action: ActionConfig) -> Self {
        action.package_name = self.name.clone();
        self.actions.insert(action.name.clone(), action);
        self
    }

    pub fn result_type(mut self, result_type: ResultTypeConfig) -> Self {
        self.result_types
            .insert(result_type.name.clone(), result_type);
        self
    }

    pub fn global_result(mut self, result: ResultConfig) -> Self {
        self.global_results.insert(result.name.clone(), result);
        self
    }

    pub fn interceptor(mut self, interceptor: InterceptorConfig) -> Self {
        self.interceptors
            .insert(interceptor.name.clone(), interceptor);
        self
    }

    pub fn interceptor_stack(mut self, stack: InterceptorStackConfig) -> Self {
        self.interceptor_stacks.insert(stack.name.clone(), stack);
        self
    }

    pub fn default_class_ref(mut self, class_name: impl Into<String>) -> Self {
        self.default_class_ref = Some(class_name.into());
        self
    }

    pub fn default_action_ref(mut self, action: impl Into<String>) -> Self {
        self.default_action_ref = Some(action.into());
        self
    }

    pub fn default_result_type(mut self, result_type: impl Into<String>) -> Self {
        self.default_result_type = Some(result_type.into());
        self
    }

    pub fn default_interceptor_ref(mut self, name: impl Into<String>) -> Self {
        self.default_interceptor_ref = Some(name.into());
        self
    }

    pub fn strict_method_invocation(mut self, strict: bool) -> Self {
        self.strict_method_invocation = Some(strict);
        self
    }

    pub fn global_allowed_method(mut self, method: impl Into<String>) -> Self {
        self.global_allowed_methods.push(method.into());
        self
    }

    pub fn exception_mapping(mut self, mapping: ExceptionMappingConfig) -> Self {
        self.exception_mappings.push(mapping);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// True when the namespace contains an unescaped `*` and is resolved by pattern.
    #[must_use]
    pub fn has_wildcard_namespace(&self) -> bool {
        !is_literal(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_takes_package_name() {
        let pkg = PackageConfig::new("shop")
            .namespace("/shop")
            .action(ActionConfig::new("list"));
        assert_eq!(pkg.actions["list"].package_name, "shop");
    }

    #[test]
    fn test_wildcard_namespace_detection() {
        assert!(PackageConfig::new("a").namespace("/*").has_wildcard_namespace());
        assert!(!PackageConfig::new("b").namespace("/users").has_wildcard_namespace());
        assert!(!PackageConfig::new("c").namespace(r"/lit\*").has_wildcard_namespace());
    }

    #[test]
    fn test_results_keep_declaration_order() {
        let action = ActionConfig::new("save")
            .result(ResultConfig::new("success"))
            .result(ResultConfig::new("input"))
            .result(ResultConfig::new("error"));
        let names: Vec<_> = action.results.keys().cloned().collect();
        assert_eq!(names, vec!["success", "input", "error"]);
    }
}
