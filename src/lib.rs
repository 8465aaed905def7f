//! # actionroute
//!
//! **actionroute** compiles declarative action configuration (packages of actions, results,
//! interceptors and their defaults) into an immutable routing table, and resolves
//! `(namespace, action name)` requests against it.
//!
//! ## Overview
//!
//! Configuration is organized into *packages*. A package has a name, an optional namespace,
//! and may extend other packages to inherit their result types, interceptors, interceptor
//! stacks, global results, exception mappings and defaults. Actions are declared inside
//! packages and may use wildcard names (`edit_*`); namespaces may also be patterns (`/*`).
//!
//! A rebuild turns the registered package set into a fresh [`RoutingTable`](router::RoutingTable)
//! that is published atomically: concurrent lookups always see either the whole previous
//! table or the whole new one.
//!
//! ## Architecture
//!
//! - **[`config`]** - Package descriptors, file loading (YAML, JSON, TOML) and providers
//! - **[`matcher`]** - Wildcard pattern compilation and ordered first-match lookup
//! - **[`resolver`]** - Package inheritance and interceptor stack expansion
//! - **[`compiler`]** - Merges an action with its package defaults into a [`CompiledAction`]
//! - **[`router`]** - Routing table construction and the resolution algorithm
//! - **[`registry`]** - Package registration, rebuild policy and atomic publication
//! - **[`mapper`]** - Maps request paths to namespace, action name and method
//! - **[`factory`]** - Instantiates interceptors and results by class name
//! - **[`dispatcher`]** - Prepares an [`ActionProxy`](dispatcher::ActionProxy) for a request
//! - **[`hot_reload`]** - Rebuilds on configuration file changes
//! - **[`logging`]** / **[`runtime_config`]** - Environment-driven process setup
//! - **[`cli`]** - The `actionroute` command
//!
//! ### Rebuild Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Registry as ConfigurationRegistry
//!     participant Resolver as resolver
//!     participant Compiler as ActionCompiler
//!     participant Build as build_routing_table
//!
//!     Caller->>Registry: rebuild(packages)
//!     Registry->>Registry: duplicate package / namespace checks
//!     Registry->>Build: build_routing_table(&packages)
//!     loop each concrete package
//!         Build->>Resolver: resolve_package_defaults(package)
//!         loop each action (own and inherited)
//!             Build->>Compiler: compile(action, defaults)
//!         end
//!     end
//!     Build-->>Registry: (RoutingTable, errors)
//!     Registry->>Registry: apply RebuildPolicy, swap table
//!     Registry-->>Caller: RebuildReport
//! ```
//!
//! ### Resolution Order
//!
//! For a request `(namespace, name)`:
//!
//! 1. The exact namespace: exact action name, then action patterns, then the default action
//! 2. The first matching namespace pattern, same three steps
//! 3. The empty namespace `""`, when the requested namespace is not blank
//!
//! ## Quick Start
//!
//! ```rust
//! use actionroute::config::{parse_packages, ConfigFormat};
//! use actionroute::registry::ConfigurationRegistry;
//!
//! let yaml = r#"
//! packages:
//!   - name: shop
//!     namespace: /shop
//!     result-types:
//!       - { name: dispatcher, class: DispatcherResult }
//!     default-result-type: dispatcher
//!     actions:
//!       - name: cart
//!         class: CartAction
//!         results: [ { name: success } ]
//! "#;
//!
//! let packages = parse_packages(yaml, ConfigFormat::Yaml, "inline").unwrap();
//! let registry = ConfigurationRegistry::default();
//! let report = registry.rebuild(packages).unwrap();
//! assert!(report.is_clean());
//!
//! let found = registry.resolve("/shop", "cart").unwrap();
//! assert_eq!(found.action.class_name.as_deref(), Some("CartAction"));
//! assert_eq!(found.action.method_name(), "execute");
//! ```
//!
//! ## Configuration
//!
//! Process-wide settings come from `ACTR_*` environment variables; see
//! [`runtime_config`] and [`logging`].

pub mod cli;
pub mod compiler;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod hot_reload;
pub mod logging;
pub mod mapper;
pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod runtime_config;

pub use compiler::{CompileSettings, CompiledAction, CompiledResult};
pub use config::{load_packages, ActionConfig, PackageConfig, PackageProvider};
pub use error::{CompilationError, ConfigError, RebuildFailure};
pub use registry::{ConfigurationRegistry, RebuildPolicy, RebuildReport};
pub use router::{ActionMatch, RoutingTable};
