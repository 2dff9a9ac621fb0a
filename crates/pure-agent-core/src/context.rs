use crate::schema::ExportConfig;
use crate::services::{ArchiveService, Notifier, SourceControl};
use std::path::{Path, PathBuf};

/// Run-level settings handed to every action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionDeps {
    pub work_dir: PathBuf,
    pub zip_output_path: PathBuf,
    pub github_token: Option<String>,
}

/// The outside world as seen by handlers.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub notifier: &'a dyn Notifier,
    pub archive: &'a dyn ArchiveService,
    pub scm: &'a dyn SourceControl,
}

/// Everything a handler may read while validating or executing. Built once
/// per run and shared read-only by every action.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub config: &'a ExportConfig,
    pub work_dir: &'a Path,
    pub zip_output_path: &'a Path,
    pub github_token: Option<&'a str>,
    pub services: Collaborators<'a>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(config: &'a ExportConfig, deps: &'a ActionDeps, services: Collaborators<'a>) -> Self {
        Self {
            config,
            work_dir: &deps.work_dir,
            zip_output_path: &deps.zip_output_path,
            github_token: deps.github_token.as_deref().filter(|t| !t.is_empty()),
            services,
        }
    }

    /// The correlated issue, when the config names a real one.
    pub fn issue_id(&self) -> Option<&'a str> {
        self.config.issue_id()
    }
}
