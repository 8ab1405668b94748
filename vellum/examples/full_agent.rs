//! End-to-end agent run using the Anthropic adapter, a calculator
//! tool, and the full runtime: permission gating, context management,
//! and the agent loop.
//!
//! Requires the ANTHROPIC_API_KEY environment variable to be set.
//!
//! Run with:
//!
//! ```sh
//! ANTHROPIC_API_KEY=sk-ant-... cargo run --example full_agent -p vellum --features provider-anthropic
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vellum::prelude::*;
use vellum_loop::ProviderSummarizer;
use vellum_permission::AlwaysDeny;
use vellum_tool::ToolDyn;

struct CalculateTool;

impl ToolDyn for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate a simple math expression. Supports +, -, *, /."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "expression": { "type": "string" } },
            "required": ["expression"],
        })
    }

    fn call(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<vellum_types::ToolResult, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let expr = input["expression"].as_str().unwrap_or_default();
            match eval_simple(expr) {
                Some(result) => Ok(vellum_types::ToolResult::ok(serde_json::json!({ "result": result }))),
                None => Ok(vellum_types::ToolResult::err(format!("cannot evaluate: {expr}"))),
            }
        })
    }
}

fn eval_simple(expr: &str) -> Option<f64> {
    for op in [" + ", " - ", " * ", " / "] {
        if let Some((left, right)) = expr.split_once(op) {
            let a: f64 = left.trim().parse().ok()?;
            let b: f64 = right.trim().parse().ok()?;
            return Some(match op.trim() {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                _ => return None,
            });
        }
    }
    expr.parse().ok()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY environment variable must be set");

    // Two client handles against the same key: one drives the main
    // loop, the other backs the compaction summarizer.
    let provider = Anthropic::new(api_key.clone()).model("claude-haiku-4-5-20251001");
    let summarizer_provider = Anthropic::new(api_key).model("claude-haiku-4-5-20251001");

    let mut config = RuntimeConfig::default();
    config.llm.provider = "anthropic".into();
    config.llm.model = "claude-haiku-4-5-20251001".into();
    config.agent.max_turns = Some(5);

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculateTool));

    let mut context = RuntimeContext::new(&config, provider, tools, "/tmp", 100_000);

    let summarizer = ProviderSummarizer::new(&summarizer_provider, config.llm.model.clone());
    let responder = AlwaysDeny;
    let cancel = CancellationToken::new();

    let outcome = context
        .agent_loop
        .run("What is 42 * 17? Use the calculate tool.", &responder, &summarizer, &cancel)
        .await?;

    println!("Stop reason:  {:?}", outcome.stop_reason);
    println!("Turns:        {}", outcome.turns);
    println!("Tool calls:   {}", outcome.tool_calls_executed);
    println!("Token usage:  {} input / {} output", outcome.usage.input_tokens, outcome.usage.output_tokens);

    Ok(())
}
