// Markdown bodies for issue comments. All comment formatting lives here.

pub fn summary_comment(summary: &str) -> String {
    format!("## Agent Work Summary\n\n{summary}")
}

pub fn report_comment(report_content: &str) -> String {
    format!("## Analysis Report\n\n{report_content}")
}

pub fn workspace_upload_comment(filename: &str, asset_url: &str) -> String {
    format!(
        "## Workspace Archive\n\nThe full agent workspace is attached.\n\n[{filename}]({asset_url})"
    )
}

pub fn pr_created_comment(title: &str, pr_url: &str) -> String {
    format!("## GitHub Pull Request Created\n\n**{title}**\n\n{pr_url}")
}

pub fn session_comment(session_id: &str) -> String {
    format!("**Claude Code Session ID:** `{session_id}`")
}
