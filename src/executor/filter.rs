//! Skip / only filtering of suite entries

use anyhow::{Context, Result};
use regex::Regex;

/// Prefix skipped by default, compared case-insensitively
pub const DEFAULT_SKIP_PREFIX: &str = "skip-";

/// Decides whether an entry runs or is recorded as SKIP.
///
/// Skip wins: a name matching both patterns is skipped.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    skip: Option<Regex>,
    only: Option<Regex>,
}

impl Filter {
    /// Compile the given patterns; `None` keeps the default for that side
    pub fn new(skip: Option<&str>, only: Option<&str>) -> Result<Self> {
        let skip = skip
            .map(|p| Regex::new(p).with_context(|| format!("Invalid skip pattern: {p}")))
            .transpose()?;
        let only = only
            .map(|p| Regex::new(p).with_context(|| format!("Invalid only pattern: {p}")))
            .transpose()?;
        Ok(Self { skip, only })
    }

    pub fn with_skip(mut self, pattern: Regex) -> Self {
        self.skip = Some(pattern);
        self
    }

    pub fn with_only(mut self, pattern: Regex) -> Self {
        self.only = Some(pattern);
        self
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        match &self.skip {
            Some(pattern) => pattern.is_match(name),
            None => has_skip_prefix(name),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.only.as_ref().map_or(true, |pattern| pattern.is_match(name))
    }

    /// `true` when the entry should run
    pub fn allows(&self, name: &str) -> bool {
        !self.is_skipped(name) && self.is_selected(name)
    }
}

fn has_skip_prefix(name: &str) -> bool {
    name.get(..DEFAULT_SKIP_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DEFAULT_SKIP_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skip_prefix() {
        let filter = Filter::default();
        assert!(filter.is_skipped("skip-me"));
        assert!(filter.is_skipped("SKIP-me"));
        assert!(!filter.is_skipped("dont-skip-me"));
        assert!(!filter.is_skipped("skip"));
        assert!(filter.is_selected("anything"));
    }

    #[test]
    fn test_multibyte_names() {
        assert!(!Filter::default().is_skipped("ski✓"));
    }

    #[test]
    fn test_skip_wins_over_only() {
        let filter = Filter::new(None, Some("^skip-")).unwrap();
        assert!(filter.is_selected("skip-this"));
        assert!(filter.is_skipped("skip-this"));
        assert!(!filter.allows("skip-this"));
        assert!(!filter.allows("other"));
    }

    #[test]
    fn test_custom_patterns() {
        let filter = Filter::new(Some("slow"), Some("(?i)^api")).unwrap();
        assert!(filter.allows("API create"));
        assert!(!filter.allows("api slow path"));
        assert!(!filter.allows("ui"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Filter::new(Some("("), None).unwrap_err();
        assert!(err.to_string().contains("Invalid skip pattern"));
    }
}
