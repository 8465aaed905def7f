//! # Runtime Configuration Module
//!
//! Environment-driven settings for compilation, path mapping and rebuilds.
//!
//! ## Environment Variables
//!
//! ### `ACTR_METHOD_REGEX`
//!
//! System-wide method-name regex used by non-strict actions without their own override.
//!
//! Default: `([A-Za-z0-9_$]*)`
//!
//! ### `ACTR_DEV_MODE`
//!
//! `true` logs configuration misses at `error` instead of `warn`.
//!
//! Default: `false`
//!
//! ### `ACTR_DYNAMIC_METHOD_INVOCATION`
//!
//! `true` enables `name!method` selection in request paths.
//!
//! Default: `false`
//!
//! ### `ACTR_ACTION_EXTENSIONS`
//!
//! Comma-separated list of accepted action extensions. An empty entry accepts paths
//! without an extension.
//!
//! Default: `action,`
//!
//! ### `ACTR_REBUILD_POLICY`
//!
//! `partial-success` or `all-or-nothing`.
//!
//! Default: `partial-success`
//!
//! ## Usage
//!
//! ```rust
//! use actionroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! let registry = config.registry();
//! let mapper = config.action_mapper();
//! # let _ = (registry, mapper);
//! ```

use std::env;
use tracing::warn;

use crate::compiler::CompileSettings;
use crate::mapper::{ActionMapper, DEFAULT_EXTENSIONS};
use crate::registry::{ConfigurationRegistry, RebuildPolicy};

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// System method regex; `None` keeps the built-in default
    pub method_regex: Option<String>,
    pub dev_mode: bool,
    pub dynamic_method_invocation: bool,
    pub action_extensions: Vec<String>,
    pub rebuild_policy: RebuildPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            method_regex: None,
            dev_mode: false,
            dynamic_method_invocation: false,
            action_extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            rebuild_policy: RebuildPolicy::default(),
        }
    }
}

fn parse_bool(key: &str, value: Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => false,
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!(key = %key, value = %v, "Unrecognized boolean, using false");
                false
            }
        },
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let method_regex = lookup("ACTR_METHOD_REGEX")
            .filter(|s| !s.trim().is_empty())
            .filter(|source| {
                let candidate = CompileSettings {
                    method_regex: Some(source.clone()),
                };
                match candidate.validate() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "Falling back to default method regex");
                        false
                    }
                }
            });
        let action_extensions = match lookup("ACTR_ACTION_EXTENSIONS") {
            Some(list) => list.split(',').map(|e| e.trim().to_string()).collect(),
            None => defaults.action_extensions,
        };
        let rebuild_policy = match lookup("ACTR_REBUILD_POLICY") {
            Some(raw) => raw.parse::<RebuildPolicy>().unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default rebuild policy");
                RebuildPolicy::default()
            }),
            None => defaults.rebuild_policy,
        };

        RuntimeConfig {
            method_regex,
            dev_mode: parse_bool("ACTR_DEV_MODE", lookup("ACTR_DEV_MODE")),
            dynamic_method_invocation: parse_bool(
                "ACTR_DYNAMIC_METHOD_INVOCATION",
                lookup("ACTR_DYNAMIC_METHOD_INVOCATION"),
            ),
            action_extensions,
            rebuild_policy,
        }
    }

    #[must_use]
    pub fn compile_settings(&self) -> CompileSettings {
        CompileSettings {
            method_regex: self.method_regex.clone(),
        }
    }

    #[must_use]
    pub fn action_mapper(&self) -> ActionMapper {
        ActionMapper::default()
            .extensions(self.action_extensions.iter().cloned())
            .dynamic_method_invocation(self.dynamic_method_invocation)
    }

    /// An empty registry using these settings.
    #[must_use]
    pub fn registry(&self) -> ConfigurationRegistry {
        ConfigurationRegistry::new(self.compile_settings(), self.rebuild_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c, RuntimeConfig::default());
        assert_eq!(c.action_extensions, vec!["action", ""]);
        assert_eq!(c.compile_settings(), CompileSettings::default());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("ACTR_METHOD_REGEX", "[a-z]+"),
            ("ACTR_DEV_MODE", "TRUE"),
            ("ACTR_DYNAMIC_METHOD_INVOCATION", "1"),
            ("ACTR_ACTION_EXTENSIONS", "do, action"),
            ("ACTR_REBUILD_POLICY", "all-or-nothing"),
        ]);
        assert_eq!(c.method_regex.as_deref(), Some("[a-z]+"));
        assert!(c.dev_mode);
        assert!(c.dynamic_method_invocation);
        assert_eq!(c.action_extensions, vec!["do", "action"]);
        assert_eq!(c.rebuild_policy, RebuildPolicy::AllOrNothing);

        let mapper = c.action_mapper();
        assert!(mapper.allows_dynamic_method_invocation());
        assert!(mapper.map("/a/b").is_none());
        assert_eq!(mapper.map("/a/b.do").unwrap().name, "b");
        assert_eq!(c.registry().policy(), RebuildPolicy::AllOrNothing);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("ACTR_DEV_MODE", "maybe"),
            ("ACTR_REBUILD_POLICY", "sometimes"),
            ("ACTR_METHOD_REGEX", "  "),
        ]);
        assert!(!c.dev_mode);
        assert_eq!(c.rebuild_policy, RebuildPolicy::PartialSuccess);
        assert!(c.method_regex.is_none());
    }

    #[test]
    fn test_invalid_method_regex_falls_back() {
        let c = config(&[("ACTR_METHOD_REGEX", "(unclosed")]);
        assert!(c.method_regex.is_none());
        assert_eq!(c.compile_settings(), CompileSettings::default());
    }
}
