use std::env;
use std::sync::LazyLock;

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_NAME_LENGTH: usize = 4;

/// What to do when the strict path hits a move the rules engine rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Surface the illegal move as an error.
    #[default]
    Strict,
    /// Return every recognizable move in document order, unvalidated.
    BestEffort,
}

impl FallbackPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "best-effort" | "best_effort" | "besteffort" | "lenient" => Some(Self::BestEffort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest variation nesting kept; deeper groups are dropped.
    pub max_depth: usize,
    pub fallback: FallbackPolicy,
    /// Number of branch moves used to name a variation.
    pub name_length: usize,
}

static ENV_DEFAULTS: LazyLock<ParseOptions> = LazyLock::new(|| ParseOptions {
    max_depth: env::var("CHESS_RAV_MAX_DEPTH")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|depth| *depth > 0)
        .unwrap_or(DEFAULT_MAX_DEPTH),
    fallback: env::var("CHESS_RAV_FALLBACK")
        .ok()
        .and_then(|s| FallbackPolicy::parse(&s))
        .unwrap_or_default(),
    name_length: DEFAULT_NAME_LENGTH,
});

impl Default for ParseOptions {
    fn default() -> Self {
        ENV_DEFAULTS.clone()
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_policy_parse() {
        assert_eq!(FallbackPolicy::parse("strict"), Some(FallbackPolicy::Strict));
        assert_eq!(
            FallbackPolicy::parse(" Best-Effort "),
            Some(FallbackPolicy::BestEffort)
        );
        assert_eq!(
            FallbackPolicy::parse("lenient"),
            Some(FallbackPolicy::BestEffort)
        );
        assert_eq!(FallbackPolicy::parse("maybe"), None);
    }

    #[test]
    fn test_builders_override_defaults() {
        let options = ParseOptions::default()
            .with_max_depth(2)
            .with_fallback(FallbackPolicy::BestEffort);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.fallback, FallbackPolicy::BestEffort);
        assert_eq!(options.name_length, DEFAULT_NAME_LENGTH);
    }
}
