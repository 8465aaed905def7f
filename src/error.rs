//! Configuration errors raised while registering packages and compiling the routing table.
//!
//! Errors are values, not panics: a rebuild collects one [`CompilationError`] per failing
//! package or action and keeps compiling everything else. A routing miss is never an error;
//! [`crate::router::RoutingTable::resolve`] returns `None` for it.

use std::fmt;

use crate::config::Location;

/// What kind of reference chain formed a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// A package is (transitively) its own parent.
    PackageParent,
    /// An interceptor stack (transitively) references itself.
    InterceptorStack,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleKind::PackageParent => write!(f, "package parent chain"),
            CycleKind::InterceptorStack => write!(f, "interceptor stack references"),
        }
    }
}

/// Structural configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A package name is already registered from a different source location.
    DuplicatePackage {
        /// The contested package name
        name: String,
        /// Where the registered package was declared
        existing: Option<Location>,
        /// Where the rejected package was declared
        incoming: Option<Location>,
    },
    /// Two concrete packages claim the same literal namespace.
    DuplicateNamespace {
        /// The contested namespace
        namespace: String,
        /// Package that already owns the namespace
        existing_package: String,
        /// Package whose registration was rejected
        package: String,
    },
    /// A reference chain loops back on itself.
    CyclicInheritance {
        /// Which kind of chain
        kind: CycleKind,
        /// Names in visiting order, ending with the repeated name
        chain: Vec<String>,
    },
    /// A result has no implementation after every merge step.
    UnresolvedDefault {
        /// Package the action is compiled for
        package: String,
        /// Action owning the result
        action: String,
        /// Result name
        result: String,
        /// Why the default could not be applied
        reason: String,
    },
    /// A parent package name does not exist in the registry.
    UnknownParentPackage {
        /// Package declaring the parent
        package: String,
        /// Missing parent name
        parent: String,
    },
    /// An interceptor binding names neither an interceptor nor a stack.
    UnknownInterceptor {
        /// Package the chain was expanded in
        package: String,
        /// Unknown reference
        name: String,
    },
    /// A wildcard pattern or method regex failed to compile.
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

impl ConfigError {
    /// Short, stable identifier for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::DuplicatePackage { .. } => "duplicate_package",
            ConfigError::DuplicateNamespace { .. } => "duplicate_namespace",
            ConfigError::CyclicInheritance { .. } => "cyclic_inheritance",
            ConfigError::UnresolvedDefault { .. } => "unresolved_default",
            ConfigError::UnknownParentPackage { .. } => "unknown_parent_package",
            ConfigError::UnknownInterceptor { .. } => "unknown_interceptor",
            ConfigError::InvalidPattern { .. } => "invalid_pattern",
        }
    }
}

fn fmt_location(loc: &Option<Location>) -> String {
    loc.as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<unknown>".to_string())
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicatePackage {
                name,
                existing,
                incoming,
            } => write!(
                f,
                "package name '{}' at location {} is already used by another package at \
                 location {}",
                name,
                fmt_location(incoming),
                fmt_location(existing)
            ),
            ConfigError::DuplicateNamespace {
                namespace,
                existing_package,
                package,
            } => write!(
                f,
                "package '{}' declares namespace '{}' which is already owned by package '{}'",
                package, namespace, existing_package
            ),
            ConfigError::CyclicInheritance { kind, chain } => {
                write!(f, "cycle detected in {}: {}", kind, chain.join(" -> "))
            }
            ConfigError::UnresolvedDefault {
                package,
                action,
                result,
                reason,
            } => write!(
                f,
                "result '{}' of action '{}' in package '{}' has no implementation: {}",
                result, action, package, reason
            ),
            ConfigError::UnknownParentPackage { package, parent } => write!(
                f,
                "parent package '{}' of package '{}' is not registered",
                parent, package
            ),
            ConfigError::UnknownInterceptor { package, name } => write!(
                f,
                "unable to find interceptor or interceptor stack '{}' visible to package '{}'",
                name, package
            ),
            ConfigError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A [`ConfigError`] attached to the entity it was discovered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    /// Package being registered or compiled
    pub package: String,
    /// Action being compiled, when the error is action-scoped
    pub action: Option<String>,
    /// The underlying error
    pub error: ConfigError,
}

impl CompilationError {
    #[must_use]
    pub fn package(package: impl Into<String>, error: ConfigError) -> Self {
        Self {
            package: package.into(),
            action: None,
            error,
        }
    }

    #[must_use]
    pub fn action(
        package: impl Into<String>,
        action: impl Into<String>,
        error: ConfigError,
    ) -> Self {
        Self {
            package: package.into(),
            action: Some(action.into()),
            error,
        }
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "[{}/{}] {}", self.package, action, self.error),
            None => write!(f, "[{}] {}", self.package, self.error),
        }
    }
}

impl std::error::Error for CompilationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Returned when an all-or-nothing rebuild hit at least one error and left the
/// previously published table in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildFailure {
    /// Every error found during the attempted rebuild
    pub errors: Vec<CompilationError>,
}

impl fmt::Display for RebuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rebuild rejected with {} error(s); previous routing table kept",
            self.errors.len()
        )?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RebuildFailure {}
