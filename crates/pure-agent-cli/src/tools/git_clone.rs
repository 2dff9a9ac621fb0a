use super::{arguments, finish, AgentTool, ToolContext, ToolError, ToolReply};
use pure_agent_core::schema::type_name;
use pure_agent_core::services::ExecOptions;
use pure_agent_core::ValidationIssue;
use serde_json::{json, Map, Value};
use std::time::Duration;

const CLONE_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_NAME_LENGTH: usize = 256;

fn has_control_chars(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_control())
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'a str> {
    match obj.get(key)? {
        Value::String(s) => Some(s),
        other => {
            issues.push(ValidationIssue::new(
                key,
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn check_url(url: Option<&str>, issues: &mut Vec<ValidationIssue>) {
    let Some(url) = url else {
        issues.push(ValidationIssue::new("url", "Required"));
        return;
    };
    if url.is_empty() {
        issues.push(ValidationIssue::new("url", "Repository URL is required"));
    }
    if url.starts_with('-') {
        issues.push(ValidationIssue::new(
            "url",
            "Repository URL must not start with a dash",
        ));
    }
    if has_control_chars(url) {
        issues.push(ValidationIssue::new(
            "url",
            "Repository URL contains invalid control characters",
        ));
    }
}

/// Rules for a directory name created directly under the work dir.
fn check_directory(dir: &str, issues: &mut Vec<ValidationIssue>) {
    let mut push = |msg: &str| issues.push(ValidationIssue::new("directory", msg));
    if dir.chars().count() > MAX_NAME_LENGTH {
        push("Directory name must be at most 256 characters");
    }
    if dir == "." || dir == ".." {
        push("Directory name must not be '.' or '..'");
    }
    if dir.contains('/') || dir.contains('\\') {
        push("Directory name must not contain path separators");
    }
    if dir.starts_with('-') {
        push("Directory name must not start with a dash");
    }
    if has_control_chars(dir) {
        push("Directory name contains invalid control characters");
    }
}

/// Last path segment of `url` without trailing slashes or a `.git` suffix.
fn infer_directory(url: &str) -> String {
    let cleaned = url.trim_end_matches('/');
    let cleaned = cleaned.strip_suffix(".git").unwrap_or(cleaned);
    cleaned
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(cleaned)
        .to_string()
}

struct CloneRequest {
    url: String,
    branch: Option<String>,
    directory: String,
}

fn parse(args: &Value) -> Result<CloneRequest, ToolError> {
    let obj = arguments(args)?;
    let mut issues = Vec::new();

    let url = optional_str(&obj, "url", &mut issues);
    if !matches!(obj.get("url"), Some(v) if !v.is_string()) {
        check_url(url, &mut issues);
    }

    let branch = optional_str(&obj, "branch", &mut issues);
    if branch.is_some_and(|b| b.chars().count() > MAX_NAME_LENGTH) {
        issues.push(ValidationIssue::new(
            "branch",
            "Branch name must be at most 256 characters",
        ));
    }

    let directory = match optional_str(&obj, "directory", &mut issues) {
        Some(dir) => {
            check_directory(dir, &mut issues);
            dir.to_string()
        }
        None => url.map(infer_directory).unwrap_or_default(),
    };
    if issues.is_empty() && !obj.contains_key("directory") {
        check_directory(&directory, &mut issues);
        if directory.is_empty() {
            issues.push(ValidationIssue::new(
                "directory",
                "Cannot infer a directory name from the repository URL",
            ));
        }
    }

    finish(
        issues,
        CloneRequest {
            url: url.unwrap_or_default().to_string(),
            branch: branch.filter(|b| !b.is_empty()).map(str::to_string),
            directory,
        },
    )
}

pub struct GitCloneTool;

impl AgentTool for GitCloneTool {
    fn name(&self) -> &str {
        "git_clone"
    }

    fn description(&self) -> &str {
        "Clone a Git repository into the working directory, to analyse, modify or reference its source"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "minLength": 1, "description": "Git repository URL (HTTPS or SSH)" },
                "branch": { "type": "string", "maxLength": MAX_NAME_LENGTH, "description": "Branch to check out. Defaults to the repository's default branch." },
                "directory": { "type": "string", "maxLength": MAX_NAME_LENGTH, "description": "Target directory name in the working directory. Inferred from the URL when omitted." }
            },
            "required": ["url"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext<'_>) -> Result<ToolReply, ToolError> {
        let req = parse(&args)?;
        let clone_path = ctx.work_dir.join(&req.directory);
        if ctx.fs.exists(&clone_path) {
            return Err(ToolError::Failed(format!(
                "Directory already exists: {}",
                req.directory
            )));
        }

        let mut git_args = vec!["clone", "--progress"];
        if let Some(branch) = &req.branch {
            git_args.extend(["--branch", branch.as_str()]);
        }
        git_args.extend([req.url.as_str(), req.directory.as_str()]);

        tracing::info!(url = %req.url, path = %clone_path.display(), "cloning repository");
        let opts = ExecOptions::in_dir(ctx.work_dir).with_timeout(CLONE_TIMEOUT);
        ctx.runner
            .run("git", &git_args, &opts)
            .map_err(|e| ToolError::Failed(format!("Failed to clone repository: {e}")))?;

        Ok(ToolReply::new(json!({
            "success": true,
            "message": "Repository cloned successfully",
            "path": clone_path.display().to_string(),
            "url": req.url,
            "branch": req.branch.as_deref().unwrap_or("default"),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Harness;

    #[test]
    fn infers_directory_from_url() {
        assert_eq!(infer_directory("https://github.com/o/repo.git"), "repo");
        assert_eq!(infer_directory("https://github.com/o/repo/"), "repo");
        assert_eq!(infer_directory("git@github.com:o/tool.git"), "tool");
    }

    #[test]
    fn clones_with_branch_into_work_dir() {
        let h = Harness::default();
        let reply = GitCloneTool
            .call(
                json!({ "url": "https://github.com/o/repo.git", "branch": "dev" }),
                &h.ctx(),
            )
            .unwrap();

        let calls = h.runner.calls.borrow();
        let (program, args, opts) = &calls[0];
        assert_eq!(program, "git");
        assert_eq!(
            args,
            &["clone", "--progress", "--branch", "dev", "https://github.com/o/repo.git", "repo"]
        );
        assert_eq!(opts.cwd.as_deref(), Some(h.work_dir.path()));
        assert_eq!(opts.timeout, Some(CLONE_TIMEOUT));
        assert_eq!(reply.data["branch"], "dev");
        assert_eq!(
            reply.data["path"],
            h.work_dir.path().join("repo").display().to_string()
        );
    }

    #[test]
    fn default_branch_reported_when_omitted() {
        let h = Harness::default();
        let reply = GitCloneTool
            .call(json!({ "url": "https://x/y.git", "directory": "src" }), &h.ctx())
            .unwrap();
        assert_eq!(reply.data["branch"], "default");
        assert_eq!(h.runner.calls.borrow()[0].1.last().unwrap(), "src");
    }

    #[test]
    fn existing_directory_is_refused() {
        let h = Harness::default();
        std::fs::create_dir(h.work_dir.path().join("repo")).unwrap();
        let err = GitCloneTool
            .call(json!({ "url": "https://x/repo" }), &h.ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "Directory already exists: repo");
        assert!(h.runner.calls.borrow().is_empty());
    }

    #[test]
    fn argument_injection_rejected() {
        let h = Harness::default();
        let err = GitCloneTool
            .call(
                json!({ "url": "--upload-pack=evil", "directory": "../up" }),
                &h.ctx(),
            )
            .unwrap_err()
            .to_string();
        assert!(err.contains("url: Repository URL must not start with a dash"));
        assert!(err.contains("directory: Directory name must not contain path separators"));
        assert!(h.runner.calls.borrow().is_empty());
    }

    #[test]
    fn control_characters_rejected() {
        let h = Harness::default();
        let err = GitCloneTool
            .call(json!({ "url": "https://x/a\nb", "directory": "ok" }), &h.ctx())
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Repository URL contains invalid control characters"));
    }

    #[test]
    fn inferred_dot_dot_rejected() {
        let h = Harness::default();
        let err = GitCloneTool
            .call(json!({ "url": "https://x/.." }), &h.ctx())
            .unwrap_err();
        assert!(err.to_string().contains("must not be '.' or '..'"));
    }

    #[test]
    fn clone_failure_is_reported() {
        let mut h = Harness::default();
        h.runner.fail = true;
        let err = GitCloneTool
            .call(json!({ "url": "https://x/repo" }), &h.ctx())
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed(_)));
        assert!(err.to_string().contains("repository not found"));
    }
}
