//! Collaborator interfaces consumed by the engine, plus their production
//! implementations. Handlers only reach the outside world through these.

pub mod archive;
pub mod exec;
pub mod fs;
pub mod git;
pub mod linear;
pub mod session;

use crate::error::Result;
use std::path::Path;

pub use archive::ZipArchiver;
pub use exec::{CommandRunner, ExecError, ExecOptions, ExecOutput, SystemRunner};
pub use fs::{Filesystem, LocalFs};
pub use git::GhSourceControl;
pub use linear::{IssueTracker, LinearClient};
pub use session::SessionFile;

/// Posts a markdown body to an issue.
pub trait Notifier {
    fn post(&self, issue_id: &str, body: &str) -> Result<()>;
}

/// A zipped directory held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub bytes: Vec<u8>,
    pub size_bytes: u64,
}

pub trait ArchiveService {
    fn archive(&self, source_dir: &Path, output_path: &Path) -> Result<Archive>;
    /// Upload the archive and return the public asset URL.
    fn upload(&self, archive: &Archive, filename: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestParams<'a> {
    pub repo_dir: &'a Path,
    pub repo: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub base: &'a str,
    pub branch: &'a str,
    pub token: &'a str,
}

pub trait SourceControl {
    /// Fail unless `token` is valid and can push to `repo`.
    fn validate_credential(&self, token: &str, repo: &str) -> Result<()>;
    /// Check out an existing, agent-prepared branch.
    fn prepare_branch(&self, repo_dir: &Path, branch: &str) -> Result<()>;
    fn push(&self, repo_dir: &Path, branch: &str, token: &str) -> Result<()>;
    /// Open a pull request and return its URL.
    fn open_pull_request(&self, params: &PullRequestParams<'_>) -> Result<String>;
}

pub trait SessionLookup {
    /// Current agent session id. Every failure reads as `None`.
    fn read_session_id(&self) -> Option<String>;
}
