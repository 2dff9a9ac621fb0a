use super::{arguments, finish, AgentTool, ToolContext, ToolError, ToolReply};
use pure_agent_core::schema::{check_string, type_name, StringField};
use pure_agent_core::services::linear::{FeatureRequest, Priority};
use pure_agent_core::ValidationIssue;
use serde_json::{json, Value};

const TITLE: StringField = StringField::new("title", 5, Some(200), false);
const REASON: StringField = StringField::new("reason", 1, Some(10_000), false);
const PRIORITIES: &str = "'urgent' | 'high' | 'medium' | 'low' | 'none'";

fn parse_priority(value: Option<&Value>, issues: &mut Vec<ValidationIssue>) -> Priority {
    let Some(value) = value else {
        return Priority::default();
    };
    match value.as_str() {
        Some(s) => Priority::parse(s).unwrap_or_else(|| {
            issues.push(ValidationIssue::new(
                "priority",
                format!("Invalid enum value. Expected {PRIORITIES}, received '{s}'"),
            ));
            Priority::default()
        }),
        None => {
            issues.push(ValidationIssue::new(
                "priority",
                format!("Expected {PRIORITIES}, received {}", type_name(value)),
            ));
            Priority::default()
        }
    }
}

/// Files a feature request for the tool surface itself, for when the agent
/// is blocked by a missing capability.
pub struct RequestFeatureTool;

impl AgentTool for RequestFeatureTool {
    fn name(&self) -> &str {
        "request_feature"
    }

    fn description(&self) -> &str {
        "Ask the developers to add or extend a tool. Use when a missing or insufficient tool prevents finishing the task; the feature becomes available in a later session."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 5, "maxLength": 200, "description": "Title of the feature request" },
                "reason": { "type": "string", "minLength": 1, "maxLength": 10000, "description": "Why this feature is needed" },
                "priority": {
                    "type": "string",
                    "enum": ["urgent", "high", "medium", "low", "none"],
                    "default": "medium",
                    "description": "Priority level for the feature request"
                }
            },
            "required": ["title", "reason"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        let obj = arguments(&args)?;
        let mut issues = Vec::new();
        let title = check_string(&obj, "", &TITLE, &mut issues);
        let reason = check_string(&obj, "", &REASON, &mut issues);
        let priority = parse_priority(obj.get("priority"), &mut issues);
        let request = finish(
            issues,
            FeatureRequest {
                title: title.unwrap_or_default(),
                reason: reason.unwrap_or_default(),
                priority,
            },
        )?;

        let created = ctx.issues.create_feature_request(&request)?;
        tracing::info!(issue = %created.issue_identifier, "feature request created");
        Ok(ToolReply::about_issue(
            json!({
                "success": true,
                "message": "Feature request created successfully",
                "issue": {
                    "id": created.issue_id,
                    "identifier": created.issue_identifier,
                    "url": created.issue_url,
                }
            }),
            created.issue_id.clone(),
        ))
    }
}
