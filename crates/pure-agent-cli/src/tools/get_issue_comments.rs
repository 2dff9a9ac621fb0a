use super::get_issue::{issue_id_schema, parse_issue_id};
use super::{AgentTool, ToolContext, ToolError, ToolReply};
use serde_json::{json, Value};

pub struct GetIssueCommentsTool;

impl AgentTool for GetIssueCommentsTool {
    fn name(&self) -> &str {
        "get_issue_comments"
    }

    fn description(&self) -> &str {
        "Fetch every comment on a Linear issue with its markdown body, author and timestamps"
    }

    fn schema(&self) -> Value {
        issue_id_schema()
    }

    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        let issue_id = parse_issue_id(&args)?;
        let comments = ctx.issues.get_issue_comments(&issue_id)?;
        Ok(ToolReply::new(json!({ "success": true, "comments": comments })))
    }
}
