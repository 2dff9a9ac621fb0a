//! Output files published for the downstream workflow step.

use crate::actions::ActionResult;
use crate::error::Result;
use crate::services::Filesystem;
use std::path::Path;

const EMPTY_OBJECT: &str = "{}";

/// Copy the export config to `output`, or write `{}` when there is no input.
pub fn ensure_config_output(fs: &dyn Filesystem, input: &Path, output: &Path) -> Result<()> {
    if fs.exists(input) {
        fs.copy(input, output)
    } else {
        fs.write(output, EMPTY_OBJECT)
    }
}

pub fn write_action_results(fs: &dyn Filesystem, output: &Path, results: &ActionResult) -> Result<()> {
    fs.write(output, &serde_json::to_string(results)?)
}

/// Best-effort outputs after a failed run: the config copy (or `{}`) and an
/// empty result map. Errors are logged, not returned.
pub fn write_fallback_outputs(fs: &dyn Filesystem, input: &Path, config_output: &Path, results_output: &Path) {
    if let Err(e) = ensure_config_output(fs, input, config_output) {
        tracing::error!(error = %e, "fallback export config output failed");
    }
    if let Err(e) = write_action_results(fs, results_output, &ActionResult::new()) {
        tracing::error!(error = %e, "fallback action results output failed");
    }
}
