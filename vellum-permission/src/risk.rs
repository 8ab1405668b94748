//! Risk classification of a tool call.

use serde_json::Value;
use vellum_types::RiskLevel;

/// A tool's declared baseline risk, before argument inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BaseRisk(pub RiskLevel);

/// Classify a tool call's risk from its declared baseline plus
/// argument inspection: any string argument that looks like an
/// absolute filesystem path outside `workspace_root` escalates the
/// result to at least `High`.
#[must_use]
pub fn classify(base: BaseRisk, input: &Value, workspace_root: &str) -> RiskLevel {
    let mut risk = base.0;
    if escapes_workspace(input, workspace_root) {
        risk = risk.max(RiskLevel::High);
    }
    risk
}

fn escapes_workspace(input: &Value, workspace_root: &str) -> bool {
    match input {
        Value::String(s) => looks_like_escaping_path(s, workspace_root),
        Value::Object(map) => map.values().any(|v| escapes_workspace(v, workspace_root)),
        Value::Array(items) => items.iter().any(|v| escapes_workspace(v, workspace_root)),
        _ => false,
    }
}

fn looks_like_escaping_path(value: &str, workspace_root: &str) -> bool {
    if !value.starts_with('/') {
        return false;
    }
    if value.contains("..") {
        return true;
    }
    !value.starts_with(workspace_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_inside_workspace_does_not_escalate() {
        let input = json!({"path": "/workspace/src/main.rs"});
        assert_eq!(classify(BaseRisk(RiskLevel::Low), &input, "/workspace"), RiskLevel::Low);
    }

    #[test]
    fn absolute_path_outside_workspace_escalates() {
        let input = json!({"path": "/etc/passwd"});
        assert_eq!(classify(BaseRisk(RiskLevel::Low), &input, "/workspace"), RiskLevel::High);
    }

    #[test]
    fn parent_traversal_escalates() {
        let input = json!({"path": "/workspace/../etc/passwd"});
        assert_eq!(classify(BaseRisk(RiskLevel::Medium), &input, "/workspace"), RiskLevel::High);
    }

    #[test]
    fn escalation_never_lowers_an_already_critical_base() {
        let input = json!({"path": "/workspace/safe.txt"});
        assert_eq!(classify(BaseRisk(RiskLevel::Critical), &input, "/workspace"), RiskLevel::Critical);
    }
}
