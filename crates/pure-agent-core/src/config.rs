use crate::error::{ExportError, Result};
use crate::types::{
    ACTION_RESULTS_FILENAME, DEFAULT_TMP_DIR, DEFAULT_WORK_DIR, EXPORT_CONFIG_FILENAME,
    WORKSPACE_ZIP_FILENAME,
};
use std::path::{Path, PathBuf};

/// Process configuration, built once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub work_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub linear_api_key: Option<String>,
    pub linear_api_url: Option<String>,
    pub github_token: Option<String>,
    pub linear_team_id: Option<String>,
    pub linear_default_project_id: Option<String>,
    pub linear_default_label_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            linear_api_key: None,
            linear_api_url: None,
            github_token: None,
            linear_team_id: None,
            linear_default_project_id: None,
            linear_default_label_id: None,
        }
    }
}

fn required<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ExportError::Config(format!("{var} is required")))
}

impl AppConfig {
    pub fn linear_api_key(&self) -> Result<&str> {
        required(&self.linear_api_key, "LINEAR_API_KEY")
    }

    pub fn linear_team_id(&self) -> Result<&str> {
        required(&self.linear_team_id, "LINEAR_TEAM_ID")
    }

    pub fn paths(&self) -> AppPaths {
        AppPaths::new(&self.work_dir, &self.tmp_dir)
    }
}

/// File locations derived from the work and tmp directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Written by the agent.
    pub export_config: PathBuf,
    /// Copy of the input, published for downstream steps.
    pub export_config_output: PathBuf,
    pub action_results_output: PathBuf,
    pub zip_output: PathBuf,
}

impl AppPaths {
    pub fn new(work_dir: &Path, tmp_dir: &Path) -> Self {
        Self {
            export_config: work_dir.join(EXPORT_CONFIG_FILENAME),
            export_config_output: tmp_dir.join(EXPORT_CONFIG_FILENAME),
            action_results_output: tmp_dir.join(ACTION_RESULTS_FILENAME),
            zip_output: tmp_dir.join(WORKSPACE_ZIP_FILENAME),
        }
    }
}
