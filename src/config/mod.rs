//! # Config Module
//!
//! The descriptor model and the loaders that produce it.
//!
//! Descriptors ([`PackageConfig`], [`ActionConfig`], [`ResultConfig`], ...) are plain data
//! built either in code through their fluent setters or from configuration files through
//! [`load_packages`]. They carry string references only: parent packages, interceptors,
//! result types and implementation classes are all resolved by name later on.
//!
//! ## File format
//!
//! YAML, JSON and TOML documents share one shape:
//!
//! ```yaml
//! packages:
//!   - name: base
//!     abstract: true
//!     result-types:
//!       - { name: dispatcher, class: DispatcherResult }
//!     interceptors:
//!       - { name: timer, class: TimerInterceptor }
//!     interceptor-stacks:
//!       - { name: basic, interceptor-refs: [timer] }
//!     default-result-type: dispatcher
//!     default-interceptor-ref: basic
//!   - name: users
//!     extends: base
//!     namespace: /users
//!     default-action-ref: index
//!     actions:
//!       - name: index
//!         class: UserIndex
//!         results:
//!           - { name: success, params: { location: /WEB-INF/users.jsp } }
//! ```

mod load;
mod provider;
mod types;

use indexmap::IndexMap;
use std::sync::Arc;

pub use load::{load_packages, parse_packages, ConfigFormat};
pub use provider::{FilePackageProvider, PackageProvider, StaticPackageProvider};
pub use types::*;

/// Registered packages keyed by name, in registration order.
pub type PackageSet = IndexMap<String, Arc<PackageConfig>>;
