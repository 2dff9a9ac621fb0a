use super::{ActionHandler, ActionResult};
use crate::context::ExecutionContext;
use crate::error::Result;

/// Explicit "nothing else to do".
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneHandler;

impl ActionHandler for NoneHandler {
    fn validate(&self, _ctx: &ExecutionContext<'_>) -> Result<()> {
        Ok(())
    }

    fn execute(&self, _ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        tracing::info!("action none: no additional work");
        Ok(ActionResult::new())
    }
}
