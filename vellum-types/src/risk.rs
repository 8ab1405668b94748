//! Risk classification shared between the permission engine and the
//! lifecycle event channel.

use serde::{Deserialize, Serialize};

/// How risky a tool call is judged to be.
///
/// Ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Minimal risk; safe to auto-approve in most trust modes.
    Low,
    /// Moderate risk.
    Medium,
    /// Elevated risk; most trust modes prompt for this.
    High,
    /// Maximal risk; never auto-approved even in `full` trust mode.
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }
}
