use super::{ActionHandler, ActionResult};
use crate::context::ExecutionContext;
use crate::error::{require_validated, ExportError, Result};
use crate::services::PullRequestParams;
use crate::templates::pr_created_comment;

/// Pushes an agent-prepared branch and opens a pull request for it.
///
/// The branch must already exist with the agent's commits; this handler never
/// creates commits or resets branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatePrHandler;

impl ActionHandler for CreatePrHandler {
    fn validate(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        if ctx.config.pr.is_none() {
            return Err(ExportError::precondition(
                "pr config is required for action 'create_pr'",
            ));
        }
        if ctx.github_token.is_none() {
            return Err(ExportError::precondition(
                "GITHUB_TOKEN environment variable is required for create_pr action",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        let pr = require_validated(ctx.config.pr.as_ref(), "pr")?;
        let token = require_validated(ctx.github_token, "github_token")?;
        let repo_dir = ctx.work_dir.join(&pr.repo_path);
        let scm = ctx.services.scm;

        tracing::info!(repo = %pr.repo, branch = %pr.branch, "action create_pr: creating pull request");

        scm.validate_credential(token, &pr.repo)?;
        scm.prepare_branch(&repo_dir, &pr.branch)?;
        scm.push(&repo_dir, &pr.branch, token)?;
        let pr_url = scm.open_pull_request(&PullRequestParams {
            repo_dir: &repo_dir,
            repo: &pr.repo,
            title: &pr.title,
            body: &pr.body,
            base: &pr.base,
            branch: &pr.branch,
            token,
        })?;

        match ctx.issue_id() {
            Some(issue_id) => ctx
                .services
                .notifier
                .post(issue_id, &pr_created_comment(&pr.title, &pr_url))
                .map_err(|e| {
                    ExportError::wrap("Failed to create PR link comment on Linear issue", e)
                })?,
            None => tracing::info!("no Linear issue; skipping PR comment"),
        }

        tracing::info!(%pr_url, "pull request created");
        Ok(ActionResult::from([("pr_url".to_string(), pr_url)]))
    }
}
