use super::{CommandRunner, ExecOptions, PullRequestParams, SourceControl};
use crate::error::{ExportError, Result};
use std::path::Path;

const GH_TOKEN_ENV: &str = "GH_TOKEN";

/// Source control backed by the `git` and `gh` CLIs.
///
/// `gh` reads its credential from `GH_TOKEN`; `gh auth setup-git` makes the
/// same token available to `git push`.
pub struct GhSourceControl<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GhSourceControl<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn gh(&self, args: &[&str], token: &str, cwd: Option<&Path>) -> std::result::Result<String, super::ExecError> {
        let mut opts = match cwd {
            Some(dir) => ExecOptions::in_dir(dir),
            None => ExecOptions::default(),
        };
        opts = opts.with_env(GH_TOKEN_ENV, token);
        self.runner.run("gh", args, &opts).map(|o| o.stdout)
    }
}

impl<R: CommandRunner> SourceControl for GhSourceControl<R> {
    fn validate_credential(&self, token: &str, repo: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(ExportError::precondition("GITHUB_TOKEN is empty or whitespace"));
        }

        self.gh(&["auth", "status"], token, None)
            .map_err(|e| ExportError::wrap("GitHub token is invalid or expired", e))?;

        let repo_path = format!("repos/{repo}");
        let push = self
            .gh(&["api", &repo_path, "--jq", ".permissions.push"], token, None)
            .map_err(|e| ExportError::wrap(format!("Cannot access repository {repo}"), e))?;
        if push.trim() != "true" {
            return Err(ExportError::precondition(format!(
                "GitHub token does not have push permission to {repo}"
            )));
        }
        Ok(())
    }

    fn prepare_branch(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        if !repo_dir.exists() {
            return Err(ExportError::precondition(format!(
                "Repository directory does not exist: {}",
                repo_dir.display()
            )));
        }
        let dir = repo_dir.to_string_lossy();

        // Repos mounted into containers are often owned by another uid.
        self.runner
            .run(
                "git",
                &["config", "--global", "--add", "safe.directory", &dir],
                &ExecOptions::default(),
            )
            .and_then(|_| {
                self.runner
                    .run("git", &["checkout", branch], &ExecOptions::in_dir(repo_dir))
            })
            .map_err(|e| ExportError::wrap("Git operation failed", e))?;
        Ok(())
    }

    fn push(&self, repo_dir: &Path, branch: &str, token: &str) -> Result<()> {
        self.gh(&["auth", "setup-git"], token, None)
            .and_then(|_| {
                let opts = ExecOptions::in_dir(repo_dir).with_env(GH_TOKEN_ENV, token);
                self.runner
                    .run("git", &["push", "-u", "origin", branch], &opts)
            })
            .map_err(|e| ExportError::wrap("Git push failed", e))?;
        Ok(())
    }

    fn open_pull_request(&self, p: &PullRequestParams<'_>) -> Result<String> {
        let args = [
            "pr", "create", "--repo", p.repo, "--title", p.title, "--body", p.body, "--base",
            p.base, "--head", p.branch,
        ];
        let out = self
            .gh(&args, p.token, Some(p.repo_dir))
            .map_err(|e| ExportError::wrap("GitHub CLI 'gh pr create' failed", e))?;
        Ok(out.trim().to_string())
    }
}
