//! Shell-glob matching for reference names and repository paths.
//!
//! Semantics are those of classic fnmatch without a pathname flag: `*`
//! matches any sequence of characters including `/`, `?` matches exactly one
//! character, matching is case-sensitive and spans the whole candidate.

/// A pattern compiled once for repeated matching.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    matcher: Option<globset::GlobMatcher>,
}

impl Pattern {
    /// Compile `raw` for matching.
    ///
    /// A pattern the glob engine cannot parse degrades to literal string
    /// equality instead of failing the whole rule list.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let matcher = globset::GlobBuilder::new(&raw)
            .case_insensitive(false)
            .build()
            .ok()
            .map(|glob| glob.compile_matcher());
        Pattern { raw, matcher }
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if this is the catch-all pattern `"*"`.
    pub fn is_match_all(&self) -> bool {
        self.raw == "*"
    }

    /// Check `candidate` against this pattern (full-string match).
    pub fn matches(&self, candidate: &str) -> bool {
        if self.is_match_all() {
            return true;
        }
        match &self.matcher {
            Some(matcher) => matcher.is_match(candidate),
            None => self.raw == candidate,
        }
    }
}

/// One-shot convenience over [`Pattern::new`] + [`Pattern::matches`].
pub fn matches(pattern: &str, candidate: &str) -> bool {
    Pattern::new(pattern).matches(candidate)
}
