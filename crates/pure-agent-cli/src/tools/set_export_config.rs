use super::{AgentTool, ToolContext, ToolError, ToolReply};
use pure_agent_core::schema::PR_FIELDS;
use pure_agent_core::types::{
    DEFAULT_PR_BASE, EXPORT_CONFIG_FILENAME, MAX_REPORT_CONTENT_LENGTH, MAX_SUMMARY_LENGTH,
};
use pure_agent_core::{validate, ExportAction};
use serde_json::{json, Map, Value};

/// JSON schema for `pr`, derived from the validator's field bounds.
fn pr_schema() -> Value {
    let mut properties = Map::new();
    for field in PR_FIELDS {
        let mut prop = json!({ "type": "string" });
        if field.min > 0 {
            prop["minLength"] = json!(field.min);
        }
        if let Some(max) = field.max {
            prop["maxLength"] = json!(max);
        }
        match field.name {
            "base" => prop["default"] = json!(DEFAULT_PR_BASE),
            "repo" => prop["description"] = json!("owner/name"),
            "repo_path" => {
                prop["description"] = json!("Repository path relative to the work directory")
            }
            _ => {}
        }
        properties.insert(field.name.to_string(), prop);
    }
    let required: Vec<&str> = PR_FIELDS
        .iter()
        .filter(|f| !f.optional)
        .map(|f| f.name)
        .collect();

    json!({
        "type": "object",
        "description": "Pull request settings (required when actions include 'create_pr').",
        "properties": properties,
        "required": required,
    })
}

pub struct SetExportConfigTool;

impl AgentTool for SetExportConfigTool {
    fn name(&self) -> &str {
        "set_export_config"
    }

    fn description(&self) -> &str {
        "Save the export config when work is complete. The summary is posted to the Linear issue and the chosen actions run after the cycle ends. Call this once, at the end of the task."
    }

    fn schema(&self) -> Value {
        let tokens: Vec<&str> = ExportAction::all().iter().map(|a| a.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "linear_issue_id": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Linear issue ID. Omit when there is no issue or the ID is unknown."
                },
                "summary": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_SUMMARY_LENGTH,
                    "description": "Work summary, always posted to the Linear issue as a comment."
                },
                "actions": {
                    "type": "array",
                    "items": { "type": "string", "enum": tokens },
                    "minItems": 1,
                    "description": "Export actions to run. 'none' and 'continue' must appear alone."
                },
                "report_content": {
                    "type": "string",
                    "maxLength": MAX_REPORT_CONTENT_LENGTH,
                    "description": "Markdown analysis report (required when actions include 'report')."
                },
                "pr": pr_schema()
            },
            "required": ["summary", "actions"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        let config = validate(&args).map_err(ToolError::InvalidInput)?;
        let path = ctx.work_dir.join(EXPORT_CONFIG_FILENAME);
        let text = serde_json::to_string_pretty(&config)
            .map_err(|e| ToolError::Failed(format!("failed to serialize export config: {e}")))?;
        ctx.fs.write(&path, &text)?;

        let tokens: Vec<&str> = config.actions.iter().map(|a| a.as_str()).collect();
        tracing::info!(path = %path.display(), actions = ?tokens, "export config saved");
        Ok(ToolReply::new(json!({
            "success": true,
            "message": format!(
                "Export config saved. Actions [{}] will be executed after the cycle completes.",
                tokens.join(", ")
            ),
            "config_path": path.display().to_string(),
        })))
    }
}
