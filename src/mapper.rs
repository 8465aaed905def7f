//! Request path to `(namespace, action, method)` mapping.
//!
//! ```rust
//! use actionroute::mapper::ActionMapper;
//!
//! let mapper = ActionMapper::default().dynamic_method_invocation(true);
//! let m = mapper.map("/shop/cart!add.action?item=3").unwrap();
//! assert_eq!(m.namespace, "/shop");
//! assert_eq!(m.name, "cart");
//! assert_eq!(m.method.as_deref(), Some("add"));
//! ```

use tracing::trace;

/// Extensions accepted when none are configured: `.action` or no extension at all.
pub const DEFAULT_EXTENSIONS: &[&str] = &["action", ""];

/// A request path broken into routing coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMapping {
    pub namespace: String,
    pub name: String,
    /// Method selected with `name!method`, when dynamic method invocation is enabled
    pub method: Option<String>,
    /// Extension stripped from the name, if any
    pub extension: Option<String>,
}

/// Parses request paths into [`ActionMapping`]s.
#[derive(Debug, Clone)]
pub struct ActionMapper {
    extensions: Vec<String>,
    dynamic_method_invocation: bool,
}

impl Default for ActionMapper {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            dynamic_method_invocation: false,
        }
    }
}

impl ActionMapper {
    /// Accepted extensions. `""` accepts names without an extension; an empty list accepts
    /// any name unchanged.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn dynamic_method_invocation(mut self, enabled: bool) -> Self {
        self.dynamic_method_invocation = enabled;
        self
    }

    #[must_use]
    pub fn allows_dynamic_method_invocation(&self) -> bool {
        self.dynamic_method_invocation
    }

    /// Map `path` (optionally carrying a query string).
    ///
    /// Returns `None` when the path's extension is not accepted.
    #[must_use]
    pub fn map(&self, path: &str) -> Option<ActionMapping> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        let (stripped, extension) = self.drop_extension(path)?;

        let (namespace, mut name) = match stripped.rfind('/') {
            None => (String::new(), stripped.to_string()),
            Some(0) => ("/".to_string(), stripped[1..].to_string()),
            Some(idx) => (stripped[..idx].to_string(), stripped[idx + 1..].to_string()),
        };

        let mut method = None;
        if self.dynamic_method_invocation {
            if let Some(bang) = name.rfind('!') {
                let selected = name[bang + 1..].to_string();
                name.truncate(bang);
                if !selected.is_empty() {
                    method = Some(selected);
                }
            }
        }

        trace!(
            path = %path,
            namespace = %namespace,
            action = %name,
            method = ?method,
            "Path mapped"
        );
        Some(ActionMapping {
            namespace,
            name,
            method,
            extension,
        })
    }

    fn drop_extension<'a>(&self, path: &'a str) -> Option<(&'a str, Option<String>)> {
        if self.extensions.is_empty() {
            return Some((path, None));
        }
        let last_segment_start = path.rfind('/').map_or(0, |i| i + 1);
        let dot = path[last_segment_start..]
            .rfind('.')
            .map(|i| last_segment_start + i);

        match dot {
            Some(dot) => {
                let ext = &path[dot + 1..];
                self.extensions
                    .iter()
                    .any(|e| !e.is_empty() && e == ext)
                    .then(|| (&path[..dot], Some(ext.to_string())))
            }
            None => self
                .extensions
                .iter()
                .any(String::is_empty)
                .then_some((path, None)),
        }
    }
}
