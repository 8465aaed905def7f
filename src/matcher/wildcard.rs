use regex::Regex;
use smallvec::SmallVec;

use crate::error::ConfigError;

/// Positional wildcard captures; index 0 is the whole matched input.
pub type Captures = SmallVec<[String; 4]>;

/// Whether `pattern` contains no unescaped `*`.
#[must_use]
pub fn is_literal(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' => return false,
            _ => {}
        }
    }
    true
}

/// Replace `{n}` placeholders in `template` with `captures[n]`.
///
/// Placeholders whose index is out of range, or that are not numeric, are left as written.
#[must_use]
pub fn substitute(template: &str, captures: &[String]) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|idx| captures.get(idx))
                .map(|value| (value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// A wildcard pattern compiled to an anchored regular expression.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
    wildcards: usize,
}

impl WildcardPattern {
    /// Compile `pattern`.
    ///
    /// Each wildcard becomes a lazy capture group, so earlier wildcards consume as little as
    /// possible and later literal text anchors at its first occurrence.
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let mut expr = String::with_capacity(pattern.len() * 2 + 2);
        expr.push('^');
        let mut literal = String::new();
        let mut wildcards = 0;

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        literal.push(escaped);
                    }
                }
                '*' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        expr.push_str("(.*?)");
                    } else {
                        expr.push_str("([^/]*?)");
                    }
                    wildcards += 1;
                }
                _ => literal.push(c),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            wildcards,
        })
    }

    /// The pattern as declared.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn wildcard_count(&self) -> usize {
        self.wildcards
    }

    /// Match `input`, returning positional captures on success.
    #[must_use]
    pub fn captures(&self, input: &str) -> Option<Captures> {
        let caps = self.regex.captures(input)?;
        let mut out = Captures::with_capacity(self.wildcards + 1);
        out.push(input.to_string());
        for i in 1..=self.wildcards {
            out.push(
                caps.get(i)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            );
        }
        Some(out)
    }
}
