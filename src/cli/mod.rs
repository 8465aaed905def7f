//! # CLI Module
//!
//! Command-line tooling for package configuration files.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Compile a configuration file and report every package and action error:
//!
//! ```bash
//! actionroute check --config conf/actions.yaml
//! actionroute check --config conf/actions.yaml --strict
//! ```
//!
//! Exits non-zero when any error is found.
//!
//! ### `routes`
//!
//! Print the compiled routing table, namespace by namespace:
//!
//! ```bash
//! actionroute routes --config conf/actions.yaml
//! ```
//!
//! ### `resolve`
//!
//! Show which action would serve a request path, and how it was found:
//!
//! ```bash
//! actionroute resolve --config conf/actions.yaml /shop/cart!add.action
//! ```
//!
//! Mapping honors `ACTR_ACTION_EXTENSIONS` and `ACTR_DYNAMIC_METHOD_INVOCATION`; see
//! [`runtime_config`](crate::runtime_config).

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
