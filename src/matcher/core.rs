use tracing::trace;

use super::wildcard::{is_literal, Captures, WildcardPattern};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
struct Mapping<T> {
    /// Pattern as declared (the loose variant reports its original pattern).
    pattern: String,
    compiled: WildcardPattern,
    target: T,
    /// Wildcards dropped by a loose variant; each is reported as an empty capture.
    padding: usize,
}

/// Result of a successful [`PatternMatcher::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'a, T> {
    /// The declared pattern that matched
    pub pattern: &'a str,
    /// Target registered with the pattern
    pub target: &'a T,
    /// Index 0 is the whole input; `1..` are the wildcard captures
    pub captures: Captures,
}

impl<T> PatternMatch<'_, T> {
    /// Captures excluding the whole-input entry at index 0.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        self.captures.get(1..).unwrap_or_default()
    }
}

/// Immutable ordered list of compiled wildcard patterns.
///
/// [`find`](Self::find) returns the first pattern, in declaration order, that matches.
#[derive(Debug, Clone)]
pub struct PatternMatcher<T> {
    mappings: Vec<Mapping<T>>,
}

impl<T> Default for PatternMatcher<T> {
    fn default() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }
}

impl<T> PatternMatcher<T> {
    /// First mapping matching `input`, or `None`.
    #[must_use]
    pub fn find(&self, input: &str) -> Option<PatternMatch<'_, T>> {
        for m in &self.mappings {
            if let Some(mut captures) = m.compiled.captures(input) {
                for _ in 0..m.padding {
                    captures.push(String::new());
                }
                trace!(pattern = %m.pattern, input = %input, "Wildcard pattern matched");
                return Some(PatternMatch {
                    pattern: &m.pattern,
                    target: &m.target,
                    captures,
                });
            }
        }
        None
    }

    /// Number of compiled mappings, loose variants included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Declared patterns in match order (loose variants repeat their pattern).
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.pattern.as_str())
    }
}

/// Accumulates patterns in declaration order and produces a [`PatternMatcher`].
#[derive(Debug)]
pub struct PatternMatcherBuilder<T> {
    loose: bool,
    mappings: Vec<Mapping<T>>,
}

impl<T: Clone> PatternMatcherBuilder<T> {
    /// `loose` enables the trailing-wildcard variant used for action names:
    /// `edit_*` also matches plain `edit`, capturing an empty string.
    #[must_use]
    pub fn new(loose: bool) -> Self {
        Self {
            loose,
            mappings: Vec::new(),
        }
    }

    /// Register `pattern`. Literal patterns are ignored and return `Ok(false)`.
    pub fn add(&mut self, pattern: &str, target: T) -> Result<bool, ConfigError> {
        if is_literal(pattern) {
            return Ok(false);
        }
        let compiled = WildcardPattern::compile(pattern)?;
        let loose_variant = if self.loose {
            loose_prefix(pattern)
                .map(WildcardPattern::compile)
                .transpose()?
        } else {
            None
        };

        let wildcards = compiled.wildcard_count();
        self.mappings.push(Mapping {
            pattern: pattern.to_string(),
            compiled,
            target: target.clone(),
            padding: 0,
        });
        if let Some(variant) = loose_variant {
            let padding = wildcards.saturating_sub(variant.wildcard_count());
            self.mappings.push(Mapping {
                pattern: pattern.to_string(),
                compiled: variant,
                target,
                padding,
            });
        }
        Ok(true)
    }

    #[must_use]
    pub fn build(self) -> PatternMatcher<T> {
        PatternMatcher {
            mappings: self.mappings,
        }
    }
}

/// For `prefix<c>*` with a single unescaped trailing `*` at index > 1, returns `prefix`.
fn loose_prefix(pattern: &str) -> Option<&str> {
    let bytes = pattern.as_bytes();
    let last_star = pattern.rfind('*')?;
    if last_star <= 1 || last_star != bytes.len() - 1 {
        return None;
    }
    let before = bytes[last_star - 1];
    if before == b'*' || before == b'\\' {
        return None;
    }
    let cut = pattern[..last_star]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)?;
    Some(&pattern[..cut])
}
