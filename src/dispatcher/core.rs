use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::compiler::CompiledAction;
use crate::factory::{
    FactoryError, Interceptor, InvocationContext, ObjectFactory, ResultRenderer,
};
use crate::mapper::{ActionMapper, ActionMapping};
use crate::registry::ConfigurationRegistry;
use crate::router::ActionMatch;

/// Why a request could not be prepared for invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The path is not an action path (e.g. an unmapped extension)
    NoMapping { path: String },
    /// No action configuration for the mapped coordinates
    ActionNotFound { namespace: String, name: String },
    /// The requested method is not allowed by the action's method policy
    MethodNotAllowed {
        namespace: String,
        name: String,
        method: String,
    },
    /// An interceptor or result class has no registered implementation
    Factory(FactoryError),
}

impl DispatchError {
    /// HTTP status a front controller should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::NoMapping { .. }
            | DispatchError::ActionNotFound { .. }
            | DispatchError::MethodNotAllowed { .. } => 404,
            DispatchError::Factory(_) => 500,
        }
    }

    /// True for configuration misses, as opposed to wiring failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoMapping { path } => write!(f, "no action mapping for path '{}'", path),
            DispatchError::ActionNotFound { namespace, name } => write!(
                f,
                "there is no action mapped for namespace [{}] and action name [{}]",
                namespace, name
            ),
            DispatchError::MethodNotAllowed {
                namespace,
                name,
                method,
            } => write!(
                f,
                "method '{}' for action '{}' in namespace [{}] is not allowed",
                method, name, namespace
            ),
            DispatchError::Factory(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Factory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FactoryError> for DispatchError {
    fn from(e: FactoryError) -> Self {
        DispatchError::Factory(e)
    }
}

/// A resolved action, ready to be invoked by the embedding application.
pub struct ActionProxy {
    matched: ActionMatch,
    method: String,
    interceptors: Vec<Arc<dyn Interceptor>>,
    factory: Arc<ObjectFactory>,
}

impl fmt::Debug for ActionProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionProxy")
            .field("namespace", &self.matched.namespace)
            .field("action", &self.matched.action.name)
            .field("method", &self.method)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl ActionProxy {
    #[must_use]
    pub fn action(&self) -> &Arc<CompiledAction> {
        &self.matched.action
    }

    /// The routing match, including how namespace and action were found.
    #[must_use]
    pub fn action_match(&self) -> &ActionMatch {
        &self.matched
    }

    /// Method to invoke: the `name!method` selection, else the configured method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    #[must_use]
    pub fn context(&self) -> InvocationContext {
        InvocationContext::new(Arc::clone(&self.matched.action), self.method.clone())
    }

    /// Run every interceptor's `before` in order. The first returned result code stops the
    /// chain and is returned.
    #[must_use]
    pub fn run_interceptors(&self, ctx: &InvocationContext) -> Option<String> {
        for (idx, interceptor) in self.interceptors.iter().enumerate() {
            if let Some(code) = interceptor.before(ctx) {
                debug!(
                    action = %self.matched.action.name,
                    interceptor = self
                        .matched
                        .action
                        .interceptors
                        .get(idx)
                        .map(|m| m.name.as_str())
                        .unwrap_or("?"),
                    result = %code,
                    "Interceptor short-circuited invocation"
                );
                return Some(code);
            }
        }
        None
    }

    /// Run every interceptor's `after`, innermost first.
    pub fn complete(&self, ctx: &InvocationContext, result: &str) {
        for interceptor in self.interceptors.iter().rev() {
            interceptor.after(ctx, result);
        }
    }

    /// Build the renderer for result `name`. `Ok(None)` when the action has no such result.
    pub fn result(&self, name: &str) -> Result<Option<Arc<dyn ResultRenderer>>, FactoryError> {
        self.matched
            .action
            .result(name)
            .map(|r| self.factory.build_result(r))
            .transpose()
    }

    /// Result name configured for `exception`, if any.
    #[must_use]
    pub fn result_for_exception(&self, exception: &str) -> Option<&str> {
        self.matched
            .action
            .find_exception_mapping(exception)
            .map(|m| m.result.as_str())
    }
}

/// Maps request paths to prepared [`ActionProxy`]s.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    registry: Arc<ConfigurationRegistry>,
    mapper: ActionMapper,
    factory: Arc<ObjectFactory>,
    dev_mode: bool,
}

impl ActionDispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<ConfigurationRegistry>,
        mapper: ActionMapper,
        factory: Arc<ObjectFactory>,
    ) -> Self {
        Self {
            registry,
            mapper,
            factory,
            dev_mode: false,
        }
    }

    /// In dev mode configuration misses are logged at `error`, otherwise at `warn`.
    #[must_use]
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ConfigurationRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn mapper(&self) -> &ActionMapper {
        &self.mapper
    }

    /// Map, resolve and bind the action for `path`.
    pub fn prepare(&self, path: &str) -> Result<ActionProxy, DispatchError> {
        let Some(mapping) = self.mapper.map(path) else {
            let err = DispatchError::NoMapping {
                path: path.to_string(),
            };
            debug!(path = %path, "Path is not an action path");
            return Err(err);
        };
        self.prepare_mapping(&mapping)
    }

    /// Resolve and bind an already mapped request.
    pub fn prepare_mapping(&self, mapping: &ActionMapping) -> Result<ActionProxy, DispatchError> {
        let Some(matched) = self.registry.resolve(&mapping.namespace, &mapping.name) else {
            return Err(self.config_miss(DispatchError::ActionNotFound {
                namespace: mapping.namespace.clone(),
                name: mapping.name.clone(),
            }));
        };

        let method = mapping
            .method
            .clone()
            .unwrap_or_else(|| matched.action.method_name().to_string());
        if !matched.action.is_allowed_method(&method) {
            return Err(self.config_miss(DispatchError::MethodNotAllowed {
                namespace: mapping.namespace.clone(),
                name: mapping.name.clone(),
                method,
            }));
        }

        let interceptors = matched
            .action
            .interceptors
            .iter()
            .map(|m| self.factory.build_interceptor(m))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(
                    namespace = %mapping.namespace,
                    action = %mapping.name,
                    error = %e,
                    "Interceptor could not be created"
                );
                DispatchError::from(e)
            })?;

        debug!(
            namespace = %mapping.namespace,
            action = %mapping.name,
            method = %method,
            served_by = %matched.namespace,
            interceptors = interceptors.len(),
            "Action prepared"
        );

        Ok(ActionProxy {
            matched,
            method,
            interceptors,
            factory: Arc::clone(&self.factory),
        })
    }

    fn config_miss(&self, err: DispatchError) -> DispatchError {
        if self.dev_mode {
            error!(error = %err, status = err.status_code(), "Could not find action or result");
        } else {
            warn!(error = %err, status = err.status_code(), "Could not find action or result");
        }
        err
    }
}
