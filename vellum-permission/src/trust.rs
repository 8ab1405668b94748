//! Trust modes and per-category overrides.

use serde::{Deserialize, Serialize};
use vellum_types::RiskLevel;

/// The global prompting posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustMode {
    /// Prompt on every tool call.
    Ask,
    /// Prompt only on `high`/`critical`; auto-approve `low`/`medium`.
    Auto,
    /// Auto-approve everything except `critical`.
    Full,
}

impl TrustMode {
    /// Whether a call at `risk` requires an interactive prompt under
    /// this mode, absent any category override.
    #[must_use]
    pub fn requires_prompt(self, risk: RiskLevel) -> bool {
        match self {
            Self::Ask => true,
            Self::Auto => risk >= RiskLevel::High,
            Self::Full => risk >= RiskLevel::Critical,
        }
    }
}

/// A per-category override of the global [`TrustMode`], matching the
/// `permissions.fileRead|fileWrite|shellExecute|networkAccess`
/// configuration knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOverride {
    /// Always prompt for this category, regardless of the global mode.
    Ask,
    /// Auto-approve this category, regardless of the global mode
    /// (still subject to the `critical` ceiling of `full` mode).
    Auto,
    /// Never allow this category; every call is denied without a
    /// prompt.
    Never,
}

/// A tool-call category a permission override can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Reading files.
    FileRead,
    /// Writing files.
    FileWrite,
    /// Executing shell commands.
    ShellExecute,
    /// Making network requests.
    NetworkAccess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_mode_always_prompts() {
        assert!(TrustMode::Ask.requires_prompt(RiskLevel::Low));
        assert!(TrustMode::Ask.requires_prompt(RiskLevel::Critical));
    }

    #[test]
    fn auto_mode_prompts_only_high_and_above() {
        assert!(!TrustMode::Auto.requires_prompt(RiskLevel::Medium));
        assert!(TrustMode::Auto.requires_prompt(RiskLevel::High));
    }

    #[test]
    fn full_mode_prompts_only_critical() {
        assert!(!TrustMode::Full.requires_prompt(RiskLevel::High));
        assert!(TrustMode::Full.requires_prompt(RiskLevel::Critical));
    }
}
