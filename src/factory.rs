//! # Factory Module
//!
//! Late binding of interceptor and result implementations.
//!
//! Compiled actions only carry class names. An [`ObjectFactory`] maps those names to
//! constructors, so the routing table stays plain data and the embedding application decides
//! what each name means.
//!
//! ```rust
//! use actionroute::factory::{Interceptor, ObjectFactory};
//! use std::sync::Arc;
//!
//! struct Timer;
//! impl Interceptor for Timer {}
//!
//! let mut factory = ObjectFactory::new();
//! factory.register_interceptor("TimerInterceptor", |_params| {
//!     Arc::new(Timer) as Arc<dyn Interceptor>
//! });
//! assert!(factory.has_interceptor("TimerInterceptor"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::compiler::{CompiledAction, CompiledResult};
use crate::config::Params;
use crate::resolver::InterceptorMapping;

/// What an interceptor or result sees about the invocation in progress.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub action: Arc<CompiledAction>,
    /// Method about to be invoked
    pub method: String,
    /// Action params, including wildcard captures
    pub params: Params,
}

impl InvocationContext {
    #[must_use]
    pub fn new(action: Arc<CompiledAction>, method: impl Into<String>) -> Self {
        let params = action.params.clone();
        Self {
            action,
            method: method.into(),
            params,
        }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// A cross-cutting step run around action invocation.
pub trait Interceptor: Send + Sync {
    /// Return a result code to short-circuit the rest of the chain.
    fn before(&self, _ctx: &InvocationContext) -> Option<String> {
        None
    }
    fn after(&self, _ctx: &InvocationContext, _result: &str) {}
}

/// Renders a named result.
pub trait ResultRenderer: Send + Sync {
    fn execute(&self, ctx: &InvocationContext, result: &CompiledResult) -> anyhow::Result<()>;
}

type InterceptorCtor = Arc<dyn Fn(&Params) -> Arc<dyn Interceptor> + Send + Sync>;
type ResultCtor = Arc<dyn Fn(&Params) -> Arc<dyn ResultRenderer> + Send + Sync>;

/// A class name with no registered constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    UnknownInterceptorClass { name: String, class_name: String },
    UnknownResultClass { name: String, class_name: String },
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::UnknownInterceptorClass { name, class_name } => write!(
                f,
                "no interceptor implementation registered for class '{}' (interceptor '{}')",
                class_name, name
            ),
            FactoryError::UnknownResultClass { name, class_name } => write!(
                f,
                "no result implementation registered for class '{}' (result '{}')",
                class_name, name
            ),
        }
    }
}

impl std::error::Error for FactoryError {}

/// Class name to constructor registry.
#[derive(Default, Clone)]
pub struct ObjectFactory {
    interceptors: HashMap<String, InterceptorCtor>,
    results: HashMap<String, ResultCtor>,
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut interceptors: Vec<_> = self.interceptors.keys().collect();
        interceptors.sort();
        let mut results: Vec<_> = self.results.keys().collect();
        results.sort();
        f.debug_struct("ObjectFactory")
            .field("interceptors", &interceptors)
            .field("results", &results)
            .finish()
    }
}

impl ObjectFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for interceptor class `class_name`. The constructor receives
    /// the merged interceptor params.
    pub fn register_interceptor<F>(&mut self, class_name: impl Into<String>, ctor: F)
    where
        F: Fn(&Params) -> Arc<dyn Interceptor> + Send + Sync + 'static,
    {
        self.interceptors.insert(class_name.into(), Arc::new(ctor));
    }

    /// Register a constructor for result class `class_name`.
    pub fn register_result<F>(&mut self, class_name: impl Into<String>, ctor: F)
    where
        F: Fn(&Params) -> Arc<dyn ResultRenderer> + Send + Sync + 'static,
    {
        self.results.insert(class_name.into(), Arc::new(ctor));
    }

    #[must_use]
    pub fn has_interceptor(&self, class_name: &str) -> bool {
        self.interceptors.contains_key(class_name)
    }

    #[must_use]
    pub fn has_result(&self, class_name: &str) -> bool {
        self.results.contains_key(class_name)
    }

    pub fn build_interceptor(
        &self,
        mapping: &InterceptorMapping,
    ) -> Result<Arc<dyn Interceptor>, FactoryError> {
        let ctor = self.interceptors.get(&mapping.class_name).ok_or_else(|| {
            FactoryError::UnknownInterceptorClass {
                name: mapping.name.clone(),
                class_name: mapping.class_name.clone(),
            }
        })?;
        Ok(ctor(&mapping.params))
    }

    pub fn build_result(
        &self,
        result: &CompiledResult,
    ) -> Result<Arc<dyn ResultRenderer>, FactoryError> {
        let ctor = self
            .results
            .get(&result.class_name)
            .ok_or_else(|| FactoryError::UnknownResultClass {
                name: result.name.clone(),
                class_name: result.class_name.clone(),
            })?;
        Ok(ctor(&result.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    impl Interceptor for Counting {
        fn before(&self, _ctx: &InvocationContext) -> Option<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[test]
    fn test_build_interceptor_passes_params() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut factory = ObjectFactory::new();
        let counter = Arc::clone(&seen);
        factory.register_interceptor("Counting", move |params: &Params| {
            counter.fetch_add(params.len(), Ordering::SeqCst);
            Arc::new(Counting(Arc::clone(&counter))) as Arc<dyn Interceptor>
        });

        let mut params = Params::new();
        params.insert("a".into(), "1".into());
        params.insert("b".into(), "2".into());
        let mapping = InterceptorMapping {
            name: "counting".into(),
            class_name: "Counting".into(),
            params,
        };
        factory.build_interceptor(&mapping).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_classes() {
        let factory = ObjectFactory::new();
        let err = factory
            .build_interceptor(&InterceptorMapping {
                name: "timer".into(),
                class_name: "Timer".into(),
                params: Params::new(),
            })
            .err()
            .unwrap();
        assert!(err.to_string().contains("'Timer'"));

        let err = factory
            .build_result(&CompiledResult {
                name: "success".into(),
                class_name: "Dispatcher".into(),
                params: Params::new(),
            })
            .err()
            .unwrap();
        assert!(matches!(err, FactoryError::UnknownResultClass { .. }));
    }
}
