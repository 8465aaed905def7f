//! # Matcher Module
//!
//! Wildcard pattern compilation and ordered first-match lookup, shared by namespace and
//! action-name routing.
//!
//! ## Pattern syntax
//!
//! - `*` matches zero or more characters, excluding `/`
//! - `**` matches zero or more characters, including `/`
//! - `\` escapes the next character
//!
//! A pattern with no unescaped `*` is *literal* and never enters a matcher; literal names are
//! served by exact map lookups, which always take precedence over pattern matches.
//!
//! ## Captures
//!
//! A successful match yields positional captures: index `0` holds the whole input and
//! `1..=n` hold what each wildcard consumed, left to right.
//!
//! ```rust
//! use actionroute::matcher::{PatternMatcherBuilder, WildcardPattern};
//!
//! let pattern = WildcardPattern::compile("edit_*").unwrap();
//! let caps = pattern.captures("edit_profile").unwrap();
//! assert_eq!(caps[1], "profile");
//!
//! let mut builder = PatternMatcherBuilder::new(false);
//! builder.add("/*", "users-ns").unwrap();
//! builder.add("/**", "catch-all").unwrap();
//! let matcher = builder.build();
//! assert_eq!(*matcher.find("/users").unwrap().target, "users-ns");
//! assert_eq!(*matcher.find("/a/b").unwrap().target, "catch-all");
//! ```
//!
//! ## Performance
//!
//! Matchers are ordered lists scanned linearly: O(n) in the number of wildcard patterns per
//! lookup miss. Pattern counts are bounded by configuration, not by request volume.

mod core;
mod wildcard;
#[cfg(test)]
mod tests;

pub use core::{PatternMatch, PatternMatcher, PatternMatcherBuilder};
pub use wildcard::{is_literal, substitute, Captures, WildcardPattern};
