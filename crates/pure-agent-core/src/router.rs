//! Continuation decision between agent runs.
//!
//! After each agent run the workflow asks whether to run the agent again. An
//! explicit `continue` action wins; any other explicit config ends the loop;
//! with no config at all the loop continues until the depth limit.

use crate::types::ExportAction;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Stop,
}

impl RouteDecision {
    pub fn as_bool(self) -> bool {
        matches!(self, RouteDecision::Continue)
    }
}

/// What the router saw in the export config text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSignal {
    Empty,
    RequestsContinue,
    Other,
    Unparseable,
}

/// Classify raw export config text. Only the `actions` list matters; the
/// rest of the document is not validated here.
pub fn classify(raw: &str) -> ConfigSignal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ConfigSignal::Empty;
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return ConfigSignal::Unparseable;
    };
    if is_blank(&value) {
        return ConfigSignal::Empty;
    }
    let continues = value["actions"]
        .as_array()
        .is_some_and(|a| a.iter().any(|t| t.as_str() == Some(ExportAction::Continue.as_str())));
    if continues {
        ConfigSignal::RequestsContinue
    } else {
        ConfigSignal::Other
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` all mean "no config".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Decide whether to run the agent again. `depth` is zero-based.
pub fn should_continue(signal: ConfigSignal, depth: u32, max_depth: u32) -> RouteDecision {
    match signal {
        ConfigSignal::RequestsContinue => RouteDecision::Continue,
        ConfigSignal::Other | ConfigSignal::Unparseable => RouteDecision::Stop,
        ConfigSignal::Empty if depth.saturating_add(1) >= max_depth => RouteDecision::Stop,
        ConfigSignal::Empty => RouteDecision::Continue,
    }
}
