//! Compaction threshold profiles and the glob-pattern model table that
//! selects one for a given model id.

use globset::Glob;

use crate::error::ContextError;

/// The three crossing points that classify a
/// [`vellum_types::ContextLevel`]. Must satisfy
/// `0 < warning < critical < overflow < 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdProfile {
    /// Fraction of the window at which the level becomes `Warning`.
    pub warning: f64,
    /// Fraction at which the level becomes `Critical`.
    pub critical: f64,
    /// Fraction at which the level becomes `Overflow`.
    pub overflow: f64,
}

impl ThresholdProfile {
    /// The default, unnamed profile: `0.75 / 0.85 / 0.95`.
    #[must_use]
    pub fn balanced() -> Self {
        Self { warning: 0.75, critical: 0.85, overflow: 0.95 }
    }

    /// Compacts earlier: `0.70 / 0.80 / 0.90`.
    #[must_use]
    pub fn conservative() -> Self {
        Self { warning: 0.70, critical: 0.80, overflow: 0.90 }
    }

    /// Compacts later: `0.85 / 0.92 / 0.97`.
    #[must_use]
    pub fn aggressive() -> Self {
        Self { warning: 0.85, critical: 0.92, overflow: 0.97 }
    }

    /// Validate `0 < warning < critical < overflow < 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidThresholds`] if the ordering or
    /// bounds are violated.
    pub fn validate(&self) -> Result<(), ContextError> {
        let ordered = 0.0 < self.warning && self.warning < self.critical && self.critical < self.overflow && self.overflow < 1.0;
        if ordered {
            Ok(())
        } else {
            Err(ContextError::InvalidThresholds(format!(
                "expected 0 < warning < critical < overflow < 1, got {}/{}/{}",
                self.warning, self.critical, self.overflow
            )))
        }
    }
}

struct PatternEntry {
    pattern: String,
    matcher: globset::GlobMatcher,
    profile: ThresholdProfile,
}

/// Resolves a model id to a [`ThresholdProfile`] via glob patterns
/// (e.g. `claude-3-opus*`, `deepseek*`, `gemini*`). Custom patterns
/// registered at runtime take precedence over built-ins, newest
/// registration first; an unmatched model id falls back to
/// [`ThresholdProfile::balanced`].
pub struct ThresholdTable {
    custom: Vec<PatternEntry>,
    builtins: Vec<PatternEntry>,
}

impl ThresholdTable {
    /// Build the table with a sensible built-in pattern set.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self { custom: Vec::new(), builtins: Vec::new() };
        table.push_builtin("claude-3-opus*", ThresholdProfile::conservative());
        table.push_builtin("claude-*", ThresholdProfile::balanced());
        table.push_builtin("gpt-4*", ThresholdProfile::balanced());
        table.push_builtin("gemini*", ThresholdProfile::aggressive());
        table.push_builtin("deepseek*", ThresholdProfile::aggressive());
        table
    }

    fn push_builtin(&mut self, pattern: &str, profile: ThresholdProfile) {
        let matcher = Glob::new(pattern).expect("built-in glob pattern is valid").compile_matcher();
        self.builtins.push(PatternEntry { pattern: pattern.to_string(), matcher, profile });
    }

    /// Register a custom pattern, taking precedence over all
    /// previously registered custom patterns and every built-in.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidThresholds`] if `profile` fails
    /// validation, or a glob error wrapped the same way if `pattern`
    /// is malformed.
    pub fn register(&mut self, pattern: impl Into<String>, profile: ThresholdProfile) -> Result<(), ContextError> {
        profile.validate()?;
        let pattern = pattern.into();
        let matcher = Glob::new(&pattern)
            .map_err(|e| ContextError::InvalidThresholds(format!("bad glob `{pattern}`: {e}")))?
            .compile_matcher();
        self.custom.push(PatternEntry { pattern, matcher, profile });
        Ok(())
    }

    /// Resolve `model_id` against custom patterns (newest-first), then
    /// built-ins, falling back to [`ThresholdProfile::balanced`].
    #[must_use]
    pub fn resolve(&self, model_id: &str) -> ThresholdProfile {
        for entry in self.custom.iter().rev() {
            if entry.matcher.is_match(model_id) {
                return entry.profile;
            }
        }
        for entry in &self.builtins {
            if entry.matcher.is_match(model_id) {
                return entry.profile;
            }
        }
        ThresholdProfile::balanced()
    }

    /// The patterns currently registered, custom first (newest last
    /// within that group), for diagnostics.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.custom.iter().chain(self.builtins.iter()).map(|e| e.pattern.as_str()).collect()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn balanced_profile_validates() {
        assert!(ThresholdProfile::balanced().validate().is_ok());
    }

    #[test]
    fn unordered_profile_is_rejected() {
        let bad = ThresholdProfile { warning: 0.9, critical: 0.8, overflow: 0.95 };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn builtin_pattern_resolves_known_model() {
        let table = ThresholdTable::with_builtins();
        assert_eq!(table.resolve("claude-3-opus-20240229"), ThresholdProfile::conservative());
        assert_eq!(table.resolve("gemini-1.5-pro"), ThresholdProfile::aggressive());
    }

    #[test]
    fn unmatched_model_falls_back_to_balanced() {
        let table = ThresholdTable::with_builtins();
        assert_eq!(table.resolve("some-unknown-model"), ThresholdProfile::balanced());
    }

    #[test]
    fn custom_pattern_takes_precedence_over_builtin() {
        let mut table = ThresholdTable::with_builtins();
        table.register("claude-*", ThresholdProfile::aggressive()).unwrap();
        assert_eq!(table.resolve("claude-3-sonnet"), ThresholdProfile::aggressive());
    }

    #[test]
    fn newest_custom_pattern_wins_over_older_custom() {
        let mut table = ThresholdTable::with_builtins();
        table.register("custom-*", ThresholdProfile::conservative()).unwrap();
        table.register("custom-*", ThresholdProfile::aggressive()).unwrap();
        assert_eq!(table.resolve("custom-model"), ThresholdProfile::aggressive());
    }

    #[test]
    fn registering_invalid_profile_is_rejected() {
        let mut table = ThresholdTable::with_builtins();
        let bad = ThresholdProfile { warning: 0.9, critical: 0.5, overflow: 0.95 };
        assert!(table.register("x*", bad).is_err());
    }

    proptest! {
        #[test]
        fn validation_accepts_iff_strictly_ordered_and_in_bounds(
            w in -0.5f64..1.5,
            c in -0.5f64..1.5,
            o in -0.5f64..1.5,
        ) {
            let profile = ThresholdProfile { warning: w, critical: c, overflow: o };
            let expected_ok = 0.0 < w && w < c && c < o && o < 1.0;
            prop_assert_eq!(profile.validate().is_ok(), expected_ok);
        }
    }
}
