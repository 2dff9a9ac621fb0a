//! Hooks run after every tool call, before the response leaves the server.

use crate::envelope::ResponseEnvelope;
use crate::tools::ToolContext;
use pure_agent_core::error::BoxError;
use pure_agent_core::templates::session_comment;

pub trait PostToolHook {
    fn name(&self) -> &str;
    /// Sees the full envelope, metadata included.
    fn run(&self, envelope: &ResponseEnvelope, ctx: &ToolContext<'_>) -> Result<(), BoxError>;
}

/// Run hooks in order. A failing hook is logged and never affects the
/// remaining hooks or the response.
pub fn run_post_tool_hooks(
    hooks: &[Box<dyn PostToolHook + '_>],
    envelope: &ResponseEnvelope,
    ctx: &ToolContext<'_>,
) {
    for hook in hooks {
        if let Err(e) = hook.run(envelope, ctx) {
            tracing::error!(hook = hook.name(), error = %e, "post-tool hook failed");
        }
    }
}

/// Links the current agent session to the issue a successful tool call
/// touched.
pub struct SessionCommentHook;

impl PostToolHook for SessionCommentHook {
    fn name(&self) -> &str {
        "session_comment"
    }

    fn run(&self, envelope: &ResponseEnvelope, ctx: &ToolContext<'_>) -> Result<(), BoxError> {
        if envelope.is_error {
            return Ok(());
        }
        let Some(issue_id) = envelope.issue_id() else {
            return Ok(());
        };
        let Some(session_id) = ctx.session.read_session_id() else {
            return Ok(());
        };
        // Informational only.
        if let Err(e) = ctx.issues.create_comment(issue_id, &session_comment(&session_id)) {
            tracing::debug!(issue_id, error = %e, "session comment not posted");
        }
        Ok(())
    }
}

pub fn default_hooks() -> Vec<Box<dyn PostToolHook>> {
    vec![Box::new(SessionCommentHook)]
}
