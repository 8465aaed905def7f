//! # Compiler Module
//!
//! Turns one [`ActionConfig`](crate::config::ActionConfig) plus its package's
//! [`PackageDefaults`](crate::resolver::PackageDefaults) into an immutable [`CompiledAction`].
//!
//! Compilation merges global results under action results, fills in result implementations
//! from result types, expands the interceptor chain, picks the method regex and orders
//! exception mappings. Every result in a compiled action has an implementation class; a result
//! that cannot get one fails compilation with
//! [`ConfigError::UnresolvedDefault`](crate::error::ConfigError::UnresolvedDefault).

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    ActionCompiler, AllowedMethods, CompileSettings, CompiledAction, CompiledResult,
    DEFAULT_METHOD, DEFAULT_METHOD_REGEX,
};
