use super::{ActionHandler, ActionResult};
use crate::context::ExecutionContext;
use crate::error::{require_validated, ExportError, Result};
use crate::templates::report_comment;

/// Posts `report_content` as an analysis report comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportHandler;

impl ActionHandler for ReportHandler {
    fn validate(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        if ctx.issue_id().is_none() {
            return Err(ExportError::precondition(
                "report action requires a valid Linear issue (linear_issue_id must be set)",
            ));
        }
        if !ctx.config.has_field("report_content") {
            return Err(ExportError::precondition(
                "report_content is required for action 'report'",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        let issue_id = require_validated(ctx.issue_id(), "linear_issue_id")?;
        let content = require_validated(ctx.config.report_content.as_deref(), "report_content")?;

        tracing::info!("action report: posting analysis report");
        ctx.services
            .notifier
            .post(issue_id, &report_comment(content))
            .map_err(|e| ExportError::wrap("Failed to create report comment on Linear issue", e))?;
        tracing::info!("report posted");
        Ok(ActionResult::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ExportConfig;
    use crate::testing::{config, Fixture};
    use serde_json::json;

    fn report_config() -> ExportConfig {
        config(json!({
            "linear_issue_id": "PA-3",
            "summary": "s",
            "actions": ["report"],
            "report_content": "findings"
        }))
    }

    #[test]
    fn posts_report_comment() {
        let fx = Fixture::default();
        let cfg = report_config();
        let ctx = fx.ctx(&cfg);
        ReportHandler.validate(&ctx).unwrap();
        assert!(ReportHandler.execute(&ctx).unwrap().is_empty());
        assert_eq!(
            fx.posts(),
            vec![(
                "PA-3".to_string(),
                "## Analysis Report\n\nfindings".to_string()
            )]
        );
    }

    #[test]
    fn requires_issue_before_content() {
        let fx = Fixture::default();
        let mut cfg = report_config();
        cfg.linear_issue_id = Some("none".into());
        cfg.report_content = None;
        let err = ReportHandler.validate(&fx.ctx(&cfg)).unwrap_err();
        assert!(err.to_string().starts_with("report action requires a valid Linear issue"));
    }

    #[test]
    fn requires_report_content() {
        let fx = Fixture::default();
        let mut cfg = report_config();
        cfg.report_content = None;
        let err = ReportHandler.validate(&fx.ctx(&cfg)).unwrap_err();
        assert_eq!(err.to_string(), "report_content is required for action 'report'");
    }

    #[test]
    fn execute_without_validate_is_internal_error() {
        let fx = Fixture::default();
        let mut cfg = report_config();
        cfg.report_content = None;
        let err = ReportHandler.execute(&fx.ctx(&cfg)).unwrap_err();
        assert!(matches!(err, ExportError::Internal(_)));
    }

    #[test]
    fn notifier_failure_is_wrapped() {
        let mut fx = Fixture::default();
        fx.notifier.fail = true;
        let cfg = report_config();
        let err = ReportHandler.execute(&fx.ctx(&cfg)).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to create report comment on Linear issue: "));
    }
}
