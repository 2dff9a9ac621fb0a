use super::{ActionHandler, ActionResult};
use crate::context::ExecutionContext;
use crate::error::Result;

/// Marker consumed by the continuation router. Reaching the export pass
/// with it is harmless but unexpected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueHandler;

impl ActionHandler for ContinueHandler {
    fn validate(&self, _ctx: &ExecutionContext<'_>) -> Result<()> {
        Ok(())
    }

    fn execute(&self, _ctx: &ExecutionContext<'_>) -> Result<ActionResult> {
        tracing::warn!("continue action reached the export pass; the router should have consumed it");
        Ok(ActionResult::new())
    }
}
