//! Export action handlers.
//!
//! Each action has a two-phase contract: `validate` inspects the run context
//! and must not touch the outside world; `execute` performs the action and
//! returns a flat string map that is merged into the run's results.

mod continue_marker;
mod create_pr;
mod none;
mod report;
mod upload_workspace;

pub use continue_marker::ContinueHandler;
pub use create_pr::CreatePrHandler;
pub use none::NoneHandler;
pub use report::ReportHandler;
pub use upload_workspace::UploadWorkspaceHandler;

use crate::context::ExecutionContext;
use crate::error::{ExportError, Result};
use crate::types::ExportAction;
use std::collections::BTreeMap;

/// Output of one action. Keys from later actions overwrite earlier ones.
pub type ActionResult = BTreeMap<String, String>;

pub trait ActionHandler {
    /// Check preconditions. No side effects.
    fn validate(&self, ctx: &ExecutionContext<'_>) -> Result<()>;
    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<ActionResult>;
}

/// The closed set of built-in handlers.
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    None(NoneHandler),
    UploadWorkspace(UploadWorkspaceHandler),
    Report(ReportHandler),
    CreatePr(CreatePrHandler),
    Continue(ContinueHandler),
}

impl Handler {
    pub fn for_action(action: ExportAction) -> Self {
        match action {
            ExportAction::None => Handler::None(NoneHandler),
            ExportAction::UploadWorkspace => Handler::UploadWorkspace(UploadWorkspaceHandler),
            ExportAction::Report => Handler::Report(ReportHandler),
            ExportAction::CreatePr => Handler::CreatePr(CreatePrHandler),
            ExportAction::Continue => Handler::Continue(ContinueHandler),
        }
    }
}

impl ActionHandler for Handler {
    fn validate(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        match self {
            Handler::None(h) => h.validate(ctx),
            Handler::UploadWorkspace(h) => h.validate(ctx),
            Handler::Report(h) => h.validate(ctx),
            Handler::CreatePr(h) => h.validate(ctx),
            Handler::Continue(h) => h.validate(ctx),
        }
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        match self {
            Handler::None(h) => h.execute(ctx),
            Handler::UploadWorkspace(h) => h.execute(ctx),
            Handler::Report(h) => h.execute(ctx),
            Handler::CreatePr(h) => h.execute(ctx),
            Handler::Continue(h) => h.execute(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps each action to its handler.
pub struct ActionRegistry<H = Handler> {
    handlers: BTreeMap<ExportAction, H>,
}

impl ActionRegistry<Handler> {
    /// One built-in handler for every action.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for &action in ExportAction::all() {
            registry.register(action, Handler::for_action(action));
        }
        registry
    }
}

impl<H: ActionHandler> ActionRegistry<H> {
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, action: ExportAction, handler: H) -> &mut Self {
        self.handlers.insert(action, handler);
        self
    }

    /// A missing handler is an engine bug, never a config problem.
    pub fn get(&self, action: ExportAction) -> Result<&H> {
        self.handlers
            .get(&action)
            .ok_or_else(|| ExportError::Internal(format!("no handler registered for action '{action}'")))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ActionRegistry<Handler> {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_action() {
        let registry = ActionRegistry::standard();
        assert_eq!(registry.len(), ExportAction::all().len());
        for &action in ExportAction::all() {
            assert!(registry.get(action).is_ok(), "missing {action}");
        }
    }

    #[test]
    fn handler_variant_matches_action() {
        assert!(matches!(
            Handler::for_action(ExportAction::CreatePr),
            Handler::CreatePr(_)
        ));
        assert!(matches!(
            Handler::for_action(ExportAction::Continue),
            Handler::Continue(_)
        ));
    }

    #[test]
    fn missing_handler_is_internal_error() {
        let registry: ActionRegistry<Handler> = ActionRegistry::empty();
        let err = registry.get(ExportAction::Report).err().unwrap();
        assert!(matches!(err, ExportError::Internal(_)));
        assert!(err.to_string().contains("'report'"));
    }
}
