//! Evidence-pack types, carried as inert data for a future
//! evidence-ranking component.

use serde::{Deserialize, Serialize};

/// A single piece of evidence gathered in support of a decision (e.g. a
/// permission grant or a compaction choice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Where the signal came from (e.g. "file_history", "user_pref").
    pub source: String,
    /// The signal's value as free text.
    pub value: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// A collection of signals assembled for a single decision point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// The signals contributing to this evidence pack.
    pub signals: Vec<Signal>,
}

impl Evidence {
    /// An empty evidence pack.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a signal.
    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// The highest-confidence signal, if any.
    #[must_use]
    pub fn strongest(&self) -> Option<&Signal> {
        self.signals
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongest_picks_highest_confidence() {
        let mut evidence = Evidence::empty();
        evidence.push(Signal { source: "a".into(), value: "x".into(), confidence: 0.3 });
        evidence.push(Signal { source: "b".into(), value: "y".into(), confidence: 0.9 });
        assert_eq!(evidence.strongest().unwrap().source, "b");
    }
}
