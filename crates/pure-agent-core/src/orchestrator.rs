//! Runs a validated export configuration.

use crate::actions::{ActionHandler, ActionRegistry, ActionResult};
use crate::context::{ActionDeps, Collaborators, ExecutionContext};
use crate::error::{ExportError, Result};
use crate::schema::ExportConfig;
use crate::templates::summary_comment;

/// Post the summary (when an issue is correlated), then validate and execute
/// each action in declared order.
///
/// The first failure aborts the run. Validation failures are wrapped as
/// [`ExportError::ActionValidation`]; execution failures pass through as-is.
/// Results merge left to right, so a later action overwrites an earlier
/// action's key.
pub fn process_export<H: ActionHandler>(
    config: &ExportConfig,
    registry: &ActionRegistry<H>,
    deps: &ActionDeps,
    services: Collaborators<'_>,
) -> Result<ActionResult> {
    match config.issue_id() {
        Some(issue_id) => {
            tracing::info!(issue_id, "posting summary comment");
            services
                .notifier
                .post(issue_id, &summary_comment(&config.summary))
                .map_err(|e| {
                    ExportError::wrap("Failed to create summary comment on Linear issue", e)
                })?;
        }
        None => tracing::info!("no linear_issue_id; skipping summary comment"),
    }

    let ctx = ExecutionContext::new(config, deps, services);
    let mut results = ActionResult::new();

    for &action in &config.actions {
        let handler = registry.get(action)?;
        tracing::info!(%action, "executing action");
        handler
            .validate(&ctx)
            .map_err(|e| ExportError::ActionValidation {
                action: action.to_string(),
                source: Box::new(e),
            })?;
        let output = handler.execute(&ctx)?;
        results.extend(output);
        tracing::info!(%action, "action completed");
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{config, Fixture};
    use crate::types::ExportAction;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records its phases into a shared log and returns canned output.
    struct Recording {
        name: &'static str,
        log: Log,
        fail_validate: bool,
        fail_execute: bool,
        output: Vec<(&'static str, &'static str)>,
    }

    impl Recording {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                fail_validate: false,
                fail_execute: false,
                output: vec![],
            }
        }

        fn returning(mut self, output: Vec<(&'static str, &'static str)>) -> Self {
            self.output = output;
            self
        }
    }

    impl ActionHandler for Recording {
        fn validate(&self, _ctx: &ExecutionContext<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("validate {}", self.name));
            if self.fail_validate {
                return Err(ExportError::precondition(format!("{} not ready", self.name)));
            }
            Ok(())
        }

        fn execute(&self, _ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
            self.log.borrow_mut().push(format!("execute {}", self.name));
            if self.fail_execute {
                return Err(ExportError::wrap(format!("{} broke", self.name), "boom"));
            }
            Ok(self
                .output
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect())
        }
    }

    fn registry(handlers: Vec<(ExportAction, Recording)>) -> ActionRegistry<Recording> {
        let mut registry = ActionRegistry::empty();
        for (action, handler) in handlers {
            registry.register(action, handler);
        }
        registry
    }

    fn report_and_pr() -> crate::schema::ExportConfig {
        config(json!({
            "linear_issue_id": "PA-1",
            "summary": "did things",
            "actions": ["report", "create_pr"],
            "report_content": "r",
            "pr": { "title": "t", "body": "", "branch": "b", "repo": "o/r", "repo_path": "r" }
        }))
    }

    #[test]
    fn summary_first_then_validate_execute_per_action() {
        let fx = Fixture::default();
        let log = Log::default();
        let reg = registry(vec![
            (ExportAction::Report, Recording::new("report", &log)),
            (ExportAction::CreatePr, Recording::new("create_pr", &log)),
        ]);

        process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap();

        assert_eq!(
            fx.posts(),
            vec![("PA-1".to_string(), "## Agent Work Summary\n\ndid things".to_string())]
        );
        assert_eq!(
            *log.borrow(),
            vec![
                "validate report",
                "execute report",
                "validate create_pr",
                "execute create_pr"
            ]
        );
    }

    #[test]
    fn validation_failure_is_prefixed_and_stops_run() {
        let fx = Fixture::default();
        let log = Log::default();
        let mut first = Recording::new("report", &log);
        first.fail_validate = true;
        let reg = registry(vec![
            (ExportAction::Report, first),
            (ExportAction::CreatePr, Recording::new("create_pr", &log)),
        ]);

        let err = process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed for action 'report': report not ready"
        );
        assert_eq!(*log.borrow(), vec!["validate report"]);
    }

    #[test]
    fn execution_failure_propagates_unwrapped() {
        let fx = Fixture::default();
        let log = Log::default();
        let mut first = Recording::new("report", &log);
        first.fail_execute = true;
        let reg = registry(vec![
            (ExportAction::Report, first),
            (ExportAction::CreatePr, Recording::new("create_pr", &log)),
        ]);

        let err = process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap_err();
        assert_eq!(err.to_string(), "report broke: boom");
        assert_eq!(*log.borrow(), vec!["validate report", "execute report"]);
    }

    #[test]
    fn later_results_overwrite_earlier_keys() {
        let fx = Fixture::default();
        let log = Log::default();
        let reg = registry(vec![
            (
                ExportAction::Report,
                Recording::new("report", &log).returning(vec![("url", "first"), ("a", "1")]),
            ),
            (
                ExportAction::CreatePr,
                Recording::new("create_pr", &log).returning(vec![("url", "second")]),
            ),
        ]);

        let results = process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap();
        assert_eq!(results.get("url").map(String::as_str), Some("second"));
        assert_eq!(results.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn no_issue_skips_summary() {
        let fx = Fixture::default();
        let cfg = config(json!({ "linear_issue_id": "none", "summary": "s", "actions": ["none"] }));
        let results =
            process_export(&cfg, &ActionRegistry::standard(), &fx.deps, fx.services()).unwrap();
        assert!(results.is_empty());
        assert!(fx.posts().is_empty());
    }

    fn create_pr_without_issue(issue_id: Option<&str>) {
        let fx = Fixture::default();
        let mut raw = json!({
            "summary": "s",
            "actions": ["create_pr"],
            "pr": { "title": "t", "body": "b", "branch": "feat", "repo": "acme/app", "repo_path": "app" }
        });
        if let Some(id) = issue_id {
            raw["linear_issue_id"] = json!(id);
        }
        let results =
            process_export(&config(raw), &ActionRegistry::standard(), &fx.deps, fx.services())
                .unwrap();

        assert_eq!(results.get("pr_url"), Some(&fx.scm.pr_url));
        assert!(fx.posts().is_empty());
        assert_eq!(fx.scm.steps.borrow().len(), 4);
    }

    #[test]
    fn absent_issue_still_returns_action_results() {
        create_pr_without_issue(None);
    }

    #[test]
    fn sentinel_issue_still_returns_action_results() {
        create_pr_without_issue(Some("none"));
    }

    #[test]
    fn summary_failure_aborts_before_actions() {
        let mut fx = Fixture::default();
        fx.notifier.fail = true;
        let log = Log::default();
        let reg = registry(vec![
            (ExportAction::Report, Recording::new("report", &log)),
            (ExportAction::CreatePr, Recording::new("create_pr", &log)),
        ]);

        let err = process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to create summary comment on Linear issue"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn missing_handler_is_internal_error() {
        let fx = Fixture::default();
        let log = Log::default();
        let reg = registry(vec![(ExportAction::Report, Recording::new("report", &log))]);

        let err = process_export(&report_and_pr(), &reg, &fx.deps, fx.services()).unwrap_err();
        assert!(matches!(err, ExportError::Internal(_)));
        assert_eq!(*log.borrow(), vec!["validate report", "execute report"]);
    }

    #[test]
    fn standard_registry_runs_upload_end_to_end() {
        let fx = Fixture::default();
        let cfg = config(json!({
            "linear_issue_id": "PA-2",
            "summary": "s",
            "actions": ["upload_workspace"]
        }));
        let results =
            process_export(&cfg, &ActionRegistry::standard(), &fx.deps, fx.services()).unwrap();
        assert!(results.contains_key("asset_url"));
        assert_eq!(fx.posts().len(), 2);
    }

    #[test]
    fn distinct_result_keys_merge() {
        let fx = Fixture::default();
        let cfg = config(json!({
            "linear_issue_id": "PA-3",
            "summary": "s",
            "actions": ["upload_workspace", "create_pr"],
            "pr": { "title": "t", "body": "b", "branch": "feat", "repo": "acme/app", "repo_path": "app" }
        }));
        let results =
            process_export(&cfg, &ActionRegistry::standard(), &fx.deps, fx.services()).unwrap();
        assert_eq!(
            results,
            ActionResult::from([
                ("asset_url".to_string(), fx.archive.asset_url.clone()),
                ("pr_url".to_string(), fx.scm.pr_url.clone()),
            ])
        );
        // summary, upload note, PR link
        assert_eq!(fx.posts().len(), 3);
    }
}
