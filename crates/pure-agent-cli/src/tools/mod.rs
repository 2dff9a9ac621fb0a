use crate::envelope::{ResponseEnvelope, ToolMeta};
use crate::hooks::{run_post_tool_hooks, PostToolHook};
use pure_agent_core::error::format_issues;
use pure_agent_core::services::{CommandRunner, Filesystem, IssueTracker, SessionLookup};
use pure_agent_core::{ExportError, ValidationIssue};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

pub mod get_export_actions;
pub mod get_issue;
pub mod get_issue_comments;
pub mod git_clone;
pub mod request_feature;
pub mod set_export_config;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation failed: {}", format_issues(.0))]
    InvalidInput(Vec<ValidationIssue>),

    #[error("{0}")]
    Failed(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl From<ExportError> for ToolError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::InvalidConfig(issues) => ToolError::InvalidInput(issues),
            other => ToolError::Failed(other.to_string()),
        }
    }
}

/// Successful tool output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub data: Value,
    pub meta: Option<ToolMeta>,
}

impl ToolReply {
    pub fn new(data: Value) -> Self {
        Self { data, meta: None }
    }

    /// Marks the reply as concerning `issue_id`, for post-call hooks.
    pub fn about_issue(data: Value, issue_id: impl Into<String>) -> Self {
        Self {
            data,
            meta: Some(ToolMeta::issue(issue_id)),
        }
    }
}

/// Shared collaborators available to every tool and hook.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub work_dir: &'a Path,
    pub issues: &'a dyn IssueTracker,
    pub session: &'a dyn SessionLookup,
    pub runner: &'a dyn CommandRunner,
    pub fs: &'a dyn Filesystem,
}

pub trait AgentTool {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError>;
}

pub fn all_tools() -> Vec<Box<dyn AgentTool>> {
    vec![
        Box::new(request_feature::RequestFeatureTool),
        Box::new(get_export_actions::GetExportActionsTool),
        Box::new(set_export_config::SetExportConfigTool),
        Box::new(get_issue::GetIssueTool),
        Box::new(get_issue_comments::GetIssueCommentsTool),
        Box::new(git_clone::GitCloneTool),
    ]
}

/// Run one tool call end to end: handler, post-call hooks, then metadata
/// stripping. Handler failures become error envelopes; nothing here fails.
pub fn dispatch(
    tools: &[Box<dyn AgentTool>],
    hooks: &[Box<dyn PostToolHook>],
    name: &str,
    args: Value,
    ctx: &ToolContext<'_>,
) -> ResponseEnvelope {
    tracing::info!(tool = name, "tool call started");
    let start = Instant::now();

    let envelope = match tools.iter().find(|t| t.name() == name) {
        None => ResponseEnvelope::error(&ToolError::NotFound(name.to_string()).to_string()),
        Some(tool) => match tool.call(args, ctx) {
            Ok(reply) => ResponseEnvelope::success(&reply.data, reply.meta),
            Err(e) => {
                if let ToolError::Failed(msg) = &e {
                    tracing::error!(tool = name, error = %msg, "tool handler error");
                }
                ResponseEnvelope::error(&e.to_string())
            }
        },
    };

    run_post_tool_hooks(hooks, &envelope, ctx);
    let envelope = envelope.stripped();

    tracing::info!(
        tool = name,
        duration_ms = start.elapsed().as_millis() as u64,
        is_error = envelope.is_error,
        "tool call completed"
    );
    envelope
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Tool arguments as an object. Absent arguments read as `{}`.
pub(crate) fn arguments(args: &Value) -> Result<Map<String, Value>, ToolError> {
    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(obj) => Ok(obj.clone()),
        other => Err(ToolError::InvalidInput(vec![ValidationIssue::new(
            "",
            format!(
                "Expected object, received {}",
                pure_agent_core::schema::type_name(other)
            ),
        )])),
    }
}

/// Turn collected issues into an error, or pass `value` through.
pub(crate) fn finish<T>(issues: Vec<ValidationIssue>, value: T) -> Result<T, ToolError> {
    if issues.is_empty() {
        Ok(value)
    } else {
        Err(ToolError::InvalidInput(issues))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use pure_agent_core::error::Result as CoreResult;
    use pure_agent_core::services::linear::{
        CreatedIssue, FeatureRequest, IssueComment, IssueDetails, IssueState,
    };
    use pure_agent_core::services::{ExecError, ExecOptions, ExecOutput, LocalFs};
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct FakeTracker {
        pub created: RefCell<Vec<FeatureRequest>>,
        pub comments: RefCell<Vec<(String, String)>>,
        pub fail: bool,
    }

    fn fail() -> ExportError {
        ExportError::wrap("Failed to reach Linear", "connection refused")
    }

    pub fn sample_issue(id: &str) -> IssueDetails {
        IssueDetails {
            id: id.to_string(),
            identifier: "PA-42".into(),
            title: "Fix login".into(),
            description: Some("Steps".into()),
            state: IssueState {
                name: "Todo".into(),
                kind: "unstarted".into(),
            },
            priority: 2.0,
            priority_label: "High".into(),
            labels: vec![],
            assignee: None,
            url: "https://linear.app/i/PA-42".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
            due_date: None,
            estimate: None,
        }
    }

    impl IssueTracker for FakeTracker {
        fn create_feature_request(&self, request: &FeatureRequest) -> CoreResult<CreatedIssue> {
            if self.fail {
                return Err(fail());
            }
            self.created.borrow_mut().push(request.clone());
            Ok(CreatedIssue {
                issue_id: "uuid-new".into(),
                issue_identifier: "PA-100".into(),
                issue_url: "https://linear.app/i/PA-100".into(),
            })
        }

        fn get_issue(&self, issue_id: &str) -> CoreResult<IssueDetails> {
            if self.fail {
                return Err(fail());
            }
            Ok(sample_issue(&format!("uuid-{issue_id}")))
        }

        fn create_comment(&self, issue_id: &str, body: &str) -> CoreResult<String> {
            if self.fail {
                return Err(fail());
            }
            self.comments
                .borrow_mut()
                .push((issue_id.to_string(), body.to_string()));
            Ok("c-1".into())
        }

        fn get_issue_comments(&self, _issue_id: &str) -> CoreResult<Vec<IssueComment>> {
            if self.fail {
                return Err(fail());
            }
            Ok(vec![IssueComment {
                id: "c-9".into(),
                body: "looks good".into(),
                user: None,
                created_at: "2026-01-02T00:00:00.000Z".into(),
                updated_at: "2026-01-02T00:00:00.000Z".into(),
                url: "https://linear.app/c/9".into(),
            }])
        }
    }

    #[derive(Default)]
    pub struct FakeSession(pub Option<String>);

    impl SessionLookup for FakeSession {
        fn read_session_id(&self) -> Option<String> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    pub struct FakeRunner {
        pub calls: RefCell<Vec<(String, Vec<String>, ExecOptions)>>,
        pub fail: bool,
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[&str],
            opts: &ExecOptions,
        ) -> std::result::Result<ExecOutput, ExecError> {
            self.calls.borrow_mut().push((
                program.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
                opts.clone(),
            ));
            if self.fail {
                return Err(ExecError::Failed {
                    program: program.to_string(),
                    status: "status 128".into(),
                    stderr: "repository not found".into(),
                });
            }
            Ok(ExecOutput::default())
        }
    }

    /// Owns one of each fake; `ctx()` borrows them.
    pub struct Harness {
        pub work_dir: tempfile::TempDir,
        pub tracker: FakeTracker,
        pub session: FakeSession,
        pub runner: FakeRunner,
    }

    impl Default for Harness {
        fn default() -> Self {
            Self {
                work_dir: tempfile::TempDir::new().unwrap(),
                tracker: FakeTracker::default(),
                session: FakeSession::default(),
                runner: FakeRunner::default(),
            }
        }
    }

    impl Harness {
        pub fn ctx(&self) -> ToolContext<'_> {
            ToolContext {
                work_dir: self.work_dir.path(),
                issues: &self.tracker,
                session: &self.session,
                runner: &self.runner,
                fs: &LocalFs,
            }
        }
    }
}
