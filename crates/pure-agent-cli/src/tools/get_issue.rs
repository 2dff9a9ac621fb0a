use super::{arguments, finish, AgentTool, ToolContext, ToolError, ToolReply};
use pure_agent_core::schema::{check_string, StringField};
use serde_json::{json, Value};

pub(crate) const ISSUE_ID: StringField = StringField::new("issue_id", 1, None, false);

pub(crate) fn issue_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "issue_id": {
                "type": "string",
                "minLength": 1,
                "description": "Linear issue ID (UUID) or identifier (e.g. 'PA-42')"
            }
        },
        "required": ["issue_id"]
    })
}

/// Parse `{issue_id}` arguments shared by the issue read tools.
pub(crate) fn parse_issue_id(args: &Value) -> Result<String, ToolError> {
    let obj = arguments(args)?;
    let mut issues = Vec::new();
    let id = check_string(&obj, "", &ISSUE_ID, &mut issues);
    finish(issues, id.unwrap_or_default())
}

pub struct GetIssueTool;

impl AgentTool for GetIssueTool {
    fn name(&self) -> &str {
        "get_issue"
    }

    fn description(&self) -> &str {
        "Fetch a Linear issue by ID or identifier: title, description, state, priority, labels, assignee and dates"
    }

    fn schema(&self) -> Value {
        issue_id_schema()
    }

    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        let issue_id = parse_issue_id(&args)?;
        let issue = ctx.issues.get_issue(&issue_id)?;
        let id = issue.id.clone();
        Ok(ToolReply::about_issue(
            json!({ "success": true, "issue": issue }),
            id,
        ))
    }
}
