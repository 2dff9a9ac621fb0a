use super::{ActionHandler, ActionResult};
use crate::context::ExecutionContext;
use crate::error::{require_validated, ExportError, Result};
use crate::templates::workspace_upload_comment;

/// Zips the work directory, attaches it to the issue and links it in a
/// comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadWorkspaceHandler;

impl ActionHandler for UploadWorkspaceHandler {
    fn validate(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        if ctx.issue_id().is_none() {
            return Err(ExportError::precondition(
                "upload_workspace action requires a valid Linear issue (linear_issue_id must be set)",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        let issue_id = require_validated(ctx.issue_id(), "linear_issue_id")?;
        let filename = format!("workspace-{}.zip", chrono::Utc::now().timestamp_millis());

        tracing::info!(work_dir = %ctx.work_dir.display(), "action upload_workspace: zipping");
        let archive = ctx
            .services
            .archive
            .archive(ctx.work_dir, ctx.zip_output_path)?;
        tracing::info!(
            size_mb = %format!("{:.2}", archive.size_bytes as f64 / 1024.0 / 1024.0),
            "workspace zip created"
        );

        let asset_url = ctx.services.archive.upload(&archive, &filename)?;
        ctx.services
            .notifier
            .post(issue_id, &workspace_upload_comment(&filename, &asset_url))
            .map_err(|e| ExportError::wrap("Failed to create upload comment on Linear issue", e))?;

        tracing::info!(%asset_url, "workspace uploaded");
        Ok(ActionResult::from([("asset_url".to_string(), asset_url)]))
    }
}
