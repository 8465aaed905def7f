use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::compiler::CompiledAction;
use crate::matcher::PatternMatcher;

/// How the namespace that served a lookup was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceSource {
    /// The requested namespace itself
    Exact,
    /// A wildcard namespace pattern
    Pattern,
    /// The empty namespace, tried last
    EmptyFallback,
}

/// How the action was found inside the serving namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    /// Exact action name
    Exact,
    /// A wildcard action name
    Pattern,
    /// The namespace's default action
    DefaultAction,
}

/// A successful [`RoutingTable::resolve`].
#[derive(Debug, Clone)]
pub struct ActionMatch {
    /// Compiled action to run. For pattern matches this is a fresh value carrying the
    /// substituted captures; the table's cached action is never modified.
    pub action: Arc<CompiledAction>,
    /// Namespace key that served the lookup
    pub namespace: String,
    pub namespace_source: NamespaceSource,
    pub action_source: ActionSource,
}

/// Compiled actions of one namespace.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRoutes {
    pub(super) actions: IndexMap<String, Arc<CompiledAction>>,
    pub(super) default_action: Option<String>,
    pub(super) patterns: PatternMatcher<Arc<CompiledAction>>,
}

impl NamespaceRoutes {
    /// Actions keyed by declared name, in registration order.
    #[must_use]
    pub fn actions(&self) -> &IndexMap<String, Arc<CompiledAction>> {
        &self.actions
    }

    #[must_use]
    pub fn default_action(&self) -> Option<&str> {
        self.default_action.as_deref()
    }

    /// Number of wildcard action mappings, loose variants included.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn find(
        &self,
        name: &str,
        namespace_vars: &[String],
    ) -> Option<(Arc<CompiledAction>, ActionSource)> {
        if let Some(action) = self.actions.get(name) {
            return Some((with_namespace_vars(action, namespace_vars), ActionSource::Exact));
        }

        if let Some(m) = self.patterns.find(name) {
            let offset = namespace_vars.len();
            let params = numbered(namespace_vars, 0).chain(numbered(m.variables(), offset));
            let action = m.target.substituted(&m.captures).with_params(params);
            return Some((Arc::new(action), ActionSource::Pattern));
        }

        let default_name = self.default_action.as_deref()?;
        self.actions
            .get(default_name)
            .map(|action| {
                (
                    with_namespace_vars(action, namespace_vars),
                    ActionSource::DefaultAction,
                )
            })
    }
}

/// Captures keyed `"offset+1"`, `"offset+2"`, ...
fn numbered(vars: &[String], offset: usize) -> impl Iterator<Item = (String, String)> + '_ {
    vars.iter()
        .enumerate()
        .map(move |(i, v)| ((offset + i + 1).to_string(), v.clone()))
}

fn with_namespace_vars(
    action: &Arc<CompiledAction>,
    namespace_vars: &[String],
) -> Arc<CompiledAction> {
    if namespace_vars.is_empty() {
        Arc::clone(action)
    } else {
        Arc::new(action.with_params(numbered(namespace_vars, 0)))
    }
}

/// Immutable snapshot of every routable action.
///
/// Built once per rebuild by [`build_routing_table`](super::build_routing_table) and replaced
/// wholesale; lookups never lock.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    pub(super) namespaces: IndexMap<String, NamespaceRoutes>,
    pub(super) namespace_patterns: PatternMatcher<String>,
    pub(super) generation: u64,
}

impl RoutingTable {
    /// Table with no namespaces, generation 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn empty_at_generation(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Resolve `(namespace, name)` to a compiled action.
    ///
    /// Lookup order, first hit wins:
    ///
    /// 1. exact namespace: exact name, then wildcard name, then the namespace default action
    /// 2. the first wildcard namespace matching `namespace`, searched the same way; its
    ///    captures become params `"1"`, `"2"`, ... and action captures continue the numbering
    /// 3. the empty namespace `""`, searched the same way, unless `namespace` is blank
    ///
    /// A miss is `None`.
    #[must_use]
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<ActionMatch> {
        let found = self.lookup(namespace, name);
        match &found {
            Some(m) => debug!(
                namespace = %namespace,
                action = %name,
                served_by = %m.namespace,
                namespace_source = ?m.namespace_source,
                action_source = ?m.action_source,
                generation = self.generation,
                "Action resolved"
            ),
            None => debug!(
                namespace = %namespace,
                action = %name,
                generation = self.generation,
                "No action configuration found"
            ),
        }
        found
    }

    fn lookup(&self, namespace: &str, name: &str) -> Option<ActionMatch> {
        if let Some(routes) = self.namespaces.get(namespace) {
            if let Some((action, action_source)) = routes.find(name, &[]) {
                return Some(ActionMatch {
                    action,
                    namespace: namespace.to_string(),
                    namespace_source: NamespaceSource::Exact,
                    action_source,
                });
            }
        }

        if let Some(m) = self.namespace_patterns.find(namespace) {
            let hit = self
                .namespaces
                .get(m.target.as_str())
                .and_then(|routes| routes.find(name, m.variables()));
            if let Some((action, action_source)) = hit {
                return Some(ActionMatch {
                    action,
                    namespace: m.target.clone(),
                    namespace_source: NamespaceSource::Pattern,
                    action_source,
                });
            }
        }

        if !namespace.trim().is_empty() {
            if let Some((action, action_source)) =
                self.namespaces.get("").and_then(|routes| routes.find(name, &[]))
            {
                return Some(ActionMatch {
                    action,
                    namespace: String::new(),
                    namespace_source: NamespaceSource::EmptyFallback,
                    action_source,
                });
            }
        }

        None
    }

    /// Rebuild counter of the registry that published this table.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Namespace keys in registration order (wildcard namespaces appear as their pattern).
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceRoutes> {
        self.namespaces.get(namespace)
    }

    /// Exact lookup with no fallback.
    #[must_use]
    pub fn action(&self, namespace: &str, name: &str) -> Option<&Arc<CompiledAction>> {
        self.namespaces.get(namespace)?.actions.get(name)
    }

    /// Total number of compiled actions across namespaces.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.namespaces.values().map(|r| r.actions.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[routes] generation={} namespaces={} actions={}",
            self.generation,
            self.namespaces.len(),
            self.action_count()
        )?;
        for (namespace, routes) in &self.namespaces {
            let shown = if namespace.is_empty() { "\"\"" } else { namespace };
            match &routes.default_action {
                Some(default) => writeln!(f, "[namespace] {shown} (default: {default})")?,
                None => writeln!(f, "[namespace] {shown}")?,
            }
            for (name, action) in &routes.actions {
                writeln!(
                    f,
                    "[action] {name} -> {}.{}() [package {}]",
                    action.class_name.as_deref().unwrap_or("-"),
                    action.method_name(),
                    action.package_name
                )?;
            }
        }
        Ok(())
    }
}
