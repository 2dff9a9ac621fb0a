//! In-memory collaborators for handler and orchestrator tests.

use crate::context::{ActionDeps, Collaborators, ExecutionContext};
use crate::error::{ExportError, Result};
use crate::schema::{self, ExportConfig};
use crate::services::{Archive, ArchiveService, Notifier, PullRequestParams, SourceControl};
use serde_json::Value;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub fn config(raw: Value) -> ExportConfig {
    schema::validate(&raw).expect("test config should be valid")
}

#[derive(Default)]
pub struct FakeNotifier {
    pub posts: RefCell<Vec<(String, String)>>,
    pub fail: bool,
}

impl Notifier for FakeNotifier {
    fn post(&self, issue_id: &str, body: &str) -> Result<()> {
        if self.fail {
            return Err(ExportError::wrap("Linear API error", "boom"));
        }
        self.posts
            .borrow_mut()
            .push((issue_id.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct FakeArchive {
    pub calls: RefCell<Vec<String>>,
    pub asset_url: String,
    pub fail_archive: bool,
}

impl Default for FakeArchive {
    fn default() -> Self {
        Self {
            calls: RefCell::default(),
            asset_url: "https://uploads.linear.app/workspace.zip".to_string(),
            fail_archive: false,
        }
    }
}

impl ArchiveService for FakeArchive {
    fn archive(&self, source_dir: &Path, output_path: &Path) -> Result<Archive> {
        self.calls.borrow_mut().push(format!(
            "archive {} -> {}",
            source_dir.display(),
            output_path.display()
        ));
        if self.fail_archive {
            return Err(ExportError::wrap("Failed to create workspace zip", "zip missing"));
        }
        Ok(Archive {
            bytes: vec![0x50, 0x4b],
            size_bytes: 2,
        })
    }

    fn upload(&self, _archive: &Archive, filename: &str) -> Result<String> {
        self.calls.borrow_mut().push(format!("upload {filename}"));
        Ok(self.asset_url.clone())
    }
}

pub struct FakeScm {
    pub steps: RefCell<Vec<String>>,
    pub fail_at: Option<&'static str>,
    pub pr_url: String,
}

impl Default for FakeScm {
    fn default() -> Self {
        Self {
            steps: RefCell::default(),
            fail_at: None,
            pr_url: "https://github.com/acme/app/pull/1".to_string(),
        }
    }
}

impl FakeScm {
    fn step(&self, name: &'static str, detail: String) -> Result<()> {
        self.steps.borrow_mut().push(format!("{name} {detail}"));
        if self.fail_at == Some(name) {
            return Err(ExportError::wrap(format!("{name} failed"), "boom"));
        }
        Ok(())
    }
}

impl SourceControl for FakeScm {
    fn validate_credential(&self, token: &str, repo: &str) -> Result<()> {
        self.step("validate_credential", format!("{token} {repo}"))
    }

    fn prepare_branch(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        self.step("prepare_branch", format!("{} {branch}", repo_dir.display()))
    }

    fn push(&self, repo_dir: &Path, branch: &str, _token: &str) -> Result<()> {
        self.step("push", format!("{} {branch}", repo_dir.display()))
    }

    fn open_pull_request(&self, params: &PullRequestParams<'_>) -> Result<String> {
        self.step(
            "open_pull_request",
            format!("{} {} -> {}", params.repo, params.branch, params.base),
        )?;
        Ok(self.pr_url.clone())
    }
}

/// Owns one of each fake plus run settings.
pub struct Fixture {
    pub notifier: FakeNotifier,
    pub archive: FakeArchive,
    pub scm: FakeScm,
    pub deps: ActionDeps,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            notifier: FakeNotifier::default(),
            archive: FakeArchive::default(),
            scm: FakeScm::default(),
            deps: ActionDeps {
                work_dir: PathBuf::from("/work"),
                zip_output_path: PathBuf::from("/tmp/workspace.zip"),
                github_token: Some("ghp_test".to_string()),
            },
        }
    }
}

impl Fixture {
    pub fn without_token(mut self) -> Self {
        self.deps.github_token = None;
        self
    }

    pub fn services(&self) -> Collaborators<'_> {
        Collaborators {
            notifier: &self.notifier,
            archive: &self.archive,
            scm: &self.scm,
        }
    }

    pub fn ctx<'a>(&'a self, config: &'a ExportConfig) -> ExecutionContext<'a> {
        ExecutionContext::new(config, &self.deps, self.services())
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.notifier.posts.borrow().clone()
    }
}
