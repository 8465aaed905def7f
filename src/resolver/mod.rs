//! # Resolver Module
//!
//! Flattens package inheritance and interceptor references.
//!
//! - [`resolve_package_defaults`] walks a package's parent chain (child first, root last)
//!   and merges it into [`PackageDefaults`]: singular defaults are overridden by the nearest
//!   declaring package, named collections accumulate with the child winning on name clashes.
//! - [`expand_interceptor_refs`] turns interceptor/stack bindings into the flat, ordered
//!   chain an action executes, recursing through nested stacks.
//!
//! Both walks keep an explicit visited list, so cycles are reported as
//! [`ConfigError::CyclicInheritance`](crate::error::ConfigError::CyclicInheritance) instead of
//! recursing forever. Packages reference their parents by name only; the registry owns every
//! descriptor.

mod inheritance;
mod interceptors;

pub use inheritance::{resolve_package_defaults, PackageDefaults, DEFAULT_STRICT_METHOD_INVOCATION};
pub use interceptors::{expand_interceptor_refs, InterceptorMapping};
