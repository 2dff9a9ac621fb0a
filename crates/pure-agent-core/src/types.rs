use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ExportAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportAction {
    None,
    UploadWorkspace,
    Report,
    CreatePr,
    Continue,
}

impl ExportAction {
    pub fn all() -> &'static [ExportAction] {
        &[
            ExportAction::None,
            ExportAction::UploadWorkspace,
            ExportAction::Report,
            ExportAction::CreatePr,
            ExportAction::Continue,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportAction::None => "none",
            ExportAction::UploadWorkspace => "upload_workspace",
            ExportAction::Report => "report",
            ExportAction::CreatePr => "create_pr",
            ExportAction::Continue => "continue",
        }
    }

    /// Must be the sole entry in `actions` when present.
    pub fn is_exclusive(self) -> bool {
        matches!(self, ExportAction::None | ExportAction::Continue)
    }

    /// Needs a real issue id (present and not `"none"`).
    pub fn requires_issue(self) -> bool {
        matches!(self, ExportAction::UploadWorkspace | ExportAction::Report)
    }

    pub fn description(self) -> &'static str {
        match self {
            ExportAction::None => {
                "No additional work. Only the work summary comment is added to the Linear issue."
            }
            ExportAction::UploadWorkspace => {
                "Zip the whole workspace and attach it to the Linear issue. Use it to share code, data and results."
            }
            ExportAction::Report => {
                "Add an analysis report as a Linear issue comment. Use it to share detailed markdown findings."
            }
            ExportAction::CreatePr => {
                "Open a GitHub pull request so code changes can be reviewed and merged."
            }
            ExportAction::Continue => {
                "End the current cycle and keep the agent loop going in the next one. Use it when the work is not finished yet."
            }
        }
    }
}

impl fmt::Display for ExportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportAction::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                let expected: Vec<String> = ExportAction::all()
                    .iter()
                    .map(|a| format!("'{a}'"))
                    .collect();
                format!(
                    "Invalid enum value. Expected {}, received '{s}'",
                    expected.join(" | ")
                )
            })
    }
}

/// Sentinel an agent writes when no issue exists.
pub const NO_ISSUE_SENTINEL: &str = "none";

/// True when `issue_id` names a real issue.
pub fn has_issue(issue_id: Option<&str>) -> bool {
    matches!(issue_id, Some(id) if !id.is_empty() && id != NO_ISSUE_SENTINEL)
}

// ---------------------------------------------------------------------------
// Limits and file names
// ---------------------------------------------------------------------------

pub const MAX_PR_TITLE_LENGTH: usize = 200;
pub const MAX_PR_BODY_LENGTH: usize = 10_000;
pub const MAX_PR_BRANCH_LENGTH: usize = 100;
pub const MAX_PR_REPO_LENGTH: usize = 200;
pub const MAX_PR_REPO_PATH_LENGTH: usize = 200;
pub const MAX_SUMMARY_LENGTH: usize = 10_000;
pub const MAX_REPORT_CONTENT_LENGTH: usize = 50_000;

pub const DEFAULT_PR_BASE: &str = "main";

pub const DEFAULT_WORK_DIR: &str = "/work";
pub const DEFAULT_TMP_DIR: &str = "/tmp";

pub const EXPORT_CONFIG_FILENAME: &str = "export_config.json";
pub const ACTION_RESULTS_FILENAME: &str = "action_results.json";
pub const WORKSPACE_ZIP_FILENAME: &str = "workspace.zip";
pub const SESSION_OUTPUT_FILENAME: &str = "last_agent_output.json";

pub const ZIP_EXCLUDE_PATTERNS: &[&str] = &[".git/*", "node_modules/*", EXPORT_CONFIG_FILENAME];
