//! Core of the agent export pass: configuration validation, action handlers,
//! orchestration and the collaborators they talk to.

pub mod actions;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod requirements;
pub mod router;
pub mod schema;
pub mod services;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{ActionHandler, ActionRegistry, ActionResult, Handler};
pub use config::{AppConfig, AppPaths};
pub use context::{ActionDeps, Collaborators, ExecutionContext};
pub use error::{ExportError, Result, ValidationIssue};
pub use orchestrator::process_export;
pub use requirements::{action_descriptors, ActionDescriptor, FIELD_REQUIREMENTS};
pub use schema::{parse_export_config, validate, ExportConfig, PrConfig};
pub use types::ExportAction;
