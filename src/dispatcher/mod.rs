//! # Dispatcher Module
//!
//! Turns request paths into prepared action invocations.
//!
//! ## Request Flow
//!
//! 1. [`ActionMapper`](crate::mapper::ActionMapper) splits the path into namespace, action
//!    name and optional `name!method` selection
//! 2. The [`ConfigurationRegistry`](crate::registry::ConfigurationRegistry) resolves the
//!    compiled action from the currently published routing table
//! 3. The requested method is checked against the action's method policy
//! 4. Interceptor implementations are bound by class name through the
//!    [`ObjectFactory`](crate::factory::ObjectFactory)
//!
//! Running the action itself belongs to the embedding application; [`ActionProxy`] hands it
//! the compiled action, the method, the bound interceptor chain and lazily built result
//! renderers.
//!
//! ## Error Handling
//!
//! - Unmapped paths, missing actions and disallowed methods are configuration misses and
//!   map to 404
//! - Unregistered interceptor or result classes are wiring failures and map to 500
//! - Misses are logged at `error` in dev mode and `warn` otherwise

mod core;

pub use core::{ActionDispatcher, ActionProxy, DispatchError};
