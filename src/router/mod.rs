//! # Router Module
//!
//! The routing table maps `(namespace, action name)` pairs to compiled actions.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building an immutable [`RoutingTable`] from the registered packages
//! - Resolving lookups with exact, wildcard and default-action matching
//! - Exposing captured wildcard values as numbered action params
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: [`build_routing_table`] resolves every concrete package's
//!    inheritance, compiles its (own and inherited) actions and groups them by namespace.
//!    Wildcard namespaces and wildcard action names are compiled into ordered
//!    [`PatternMatcher`](crate::matcher::PatternMatcher)s.
//!
//! 2. **Matching**: [`RoutingTable::resolve`] consults the exact maps first, then the
//!    wildcard matchers, then the namespace default action, and finally retries in the
//!    empty namespace.
//!
//! ## Example
//!
//! ```rust
//! use actionroute::compiler::CompileSettings;
//! use actionroute::config::{ActionConfig, PackageConfig, PackageSet};
//! use actionroute::router::{build_routing_table, ActionSource};
//! use std::sync::Arc;
//!
//! let pkg = PackageConfig::new("users")
//!     .namespace("/users")
//!     .action(ActionConfig::new("list").class("UserList"))
//!     .action(ActionConfig::new("edit_*").class("UserEdit").method("{1}"));
//! let packages: PackageSet = [(pkg.name.clone(), Arc::new(pkg))].into_iter().collect();
//!
//! let (table, errors) = build_routing_table(&packages, &CompileSettings::default(), 1);
//! assert!(errors.is_empty());
//!
//! let m = table.resolve("/users", "edit_profile").unwrap();
//! assert_eq!(m.action_source, ActionSource::Pattern);
//! assert_eq!(m.action.method_name(), "profile");
//! assert_eq!(m.action.params["1"], "profile");
//! ```
//!
//! ## Performance
//!
//! Exact lookups are hash-map hits. Wildcard lookups scan the ordered matchers, O(n) in the
//! number of wildcard patterns (not in request volume), and allocate one new compiled action
//! per pattern match so the cached entry is never modified.

mod build;
mod core;

pub use build::build_routing_table;
pub use core::{ActionMatch, ActionSource, NamespaceRoutes, NamespaceSource, RoutingTable};
