//! Compiled domain patterns.
//!
//! A pattern is the key a rule is stored under: a hostname such as
//! `github.com`, or a glob such as `*.wikipedia.org`. Patterns are compiled
//! once, when the rule enters [`Settings`](crate::Settings), into one of two
//! matchers:
//!
//! | Pattern text | Matcher | Matches when |
//! |--------------|---------|--------------|
//! | no `*` | [`DomainPattern::Exact`] | domain contains the pattern |
//! | contains `*` | [`DomainPattern::Glob`] | the glob regex finds a match |
//!
//! Matching is case-insensitive and unanchored: `example.com` also matches
//! `www.example.com`. Characters other than `*` are literal, so the dot in
//! `a.com` does not match `abcom`.
//!
//! Patterns are globs, not regular expressions. Regex syntax in a pattern is
//! matched as text, so `^github\.com$` only matches a domain containing
//! those exact characters.
//!
//! The pattern text is kept verbatim, surrounding whitespace included, as
//! the identity of the rule: `" a.com"` and `"a.com"` are distinct rules and
//! persist under their own keys. Whitespace is ignored only for matching.

use regex::{Regex, RegexBuilder};

use crate::error::{NocturneError, Result};
use crate::settings::TIME_RANGE_KEY;

/// A domain pattern compiled for repeated matching.
#[derive(Debug, Clone)]
pub enum DomainPattern {
    /// Literal host text, stored lowercased.
    Exact {
        source: String,
        needle: String,
    },
    /// Wildcard glob compiled to a case-insensitive regex.
    Glob { source: String, regex: Regex },
}

impl DomainPattern {
    /// Compiles pattern text.
    ///
    /// Blank patterns and the reserved settings key are rejected.
    pub fn compile(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(NocturneError::pattern(source, "pattern is empty"));
        }
        if source == TIME_RANGE_KEY {
            return Err(NocturneError::pattern(
                source,
                "reserved for the time range",
            ));
        }

        if !trimmed.contains('*') {
            return Ok(DomainPattern::Exact {
                source: source.to_string(),
                needle: trimmed.to_lowercase(),
            });
        }

        let expression = trimmed
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()?;

        Ok(DomainPattern::Glob {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern text exactly as entered.
    pub fn as_str(&self) -> &str {
        match self {
            DomainPattern::Exact { source, .. } | DomainPattern::Glob { source, .. } => source,
        }
    }

    /// Returns `true` for wildcard patterns.
    pub fn is_glob(&self) -> bool {
        matches!(self, DomainPattern::Glob { .. })
    }

    /// Tests a hostname against this pattern.
    pub fn matches(&self, domain: &str) -> bool {
        match self {
            DomainPattern::Exact { needle, .. } => domain.to_lowercase().contains(needle.as_str()),
            DomainPattern::Glob { regex, .. } => regex.is_match(domain),
        }
    }
}

impl PartialEq for DomainPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for DomainPattern {}

impl std::fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
