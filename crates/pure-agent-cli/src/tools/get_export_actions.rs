use super::{AgentTool, ToolContext, ToolError, ToolReply};
use pure_agent_core::action_descriptors;
use serde_json::{json, Value};

pub struct GetExportActionsTool;

impl AgentTool for GetExportActionsTool {
    fn name(&self) -> &str {
        "get_export_actions"
    }

    fn description(&self) -> &str {
        "List the export actions available when finishing work, with the fields each one requires"
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: Value, _ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        Ok(ToolReply::new(json!({
            "success": true,
            "actions": action_descriptors(),
        })))
    }
}
