//! Minimal Linear GraphQL client.
//!
//! Covers the handful of operations the export pass and the tool surface use:
//! comments, file uploads, issue reads and issue creation.

use super::Notifier;
use crate::error::{ExportError, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Uploads can be large; give them more room than a GraphQL call.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum LinearError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{status} - {body}")]
    Status { status: String, body: String },

    #[error("Linear API error: {0}")]
    GraphQl(String),

    #[error("{0}")]
    Unexpected(String),
}

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    None,
}

impl Priority {
    /// Linear's numeric priority: 0 = none, 1 = urgent ... 4 = low.
    pub fn value(self) -> u8 {
        match self {
            Priority::None => 0,
            Priority::Urgent => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "urgent" => Some(Priority::Urgent),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            "none" => Some(Priority::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest {
    pub title: String,
    pub reason: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIssue {
    pub issue_id: String,
    pub issue_identifier: String,
    pub issue_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueState {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: IssueState,
    pub priority: f64,
    pub priority_label: String,
    pub labels: Vec<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueComment {
    pub id: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
}

/// Pre-signed upload slot returned by `fileUpload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub asset_url: String,
    #[serde(default)]
    pub headers: Vec<UploadHeader>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadHeader {
    pub key: String,
    pub value: String,
}

/// Issue operations exposed through the tool surface.
pub trait IssueTracker {
    fn create_feature_request(&self, request: &FeatureRequest) -> Result<CreatedIssue>;
    fn get_issue(&self, issue_id: &str) -> Result<IssueDetails>;
    /// Returns the new comment's id.
    fn create_comment(&self, issue_id: &str, body: &str) -> Result<String>;
    fn get_issue_comments(&self, issue_id: &str) -> Result<Vec<IssueComment>>;
}

// ---------------------------------------------------------------------------
// GraphQL documents and raw response shapes
// ---------------------------------------------------------------------------

const COMMENT_CREATE: &str = "mutation CommentCreate($input: CommentCreateInput!) { commentCreate(input: $input) { success comment { id } } }";

const FILE_UPLOAD: &str = "mutation FileUpload($contentType: String!, $filename: String!, $size: Int!) { fileUpload(contentType: $contentType, filename: $filename, size: $size) { success uploadFile { uploadUrl assetUrl headers { key value } } } }";

const ISSUE: &str = "query Issue($id: String!) { issue(id: $id) { id identifier title description priority priorityLabel url createdAt updatedAt dueDate estimate state { name type } assignee { id name email } labels { nodes { id name color } } } }";

const ISSUE_COMMENTS: &str = "query IssueComments($id: String!) { issue(id: $id) { comments { nodes { id body createdAt updatedAt url user { id name email } } } } }";

const ISSUE_CREATE: &str = "mutation IssueCreate($input: IssueCreateInput!) { issueCreate(input: $input) { success issue { id identifier url } } }";

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct CommentCreatePayload {
    success: bool,
    comment: Option<IdOnly>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileUploadPayload {
    upload_file: Option<UploadTarget>,
}

#[derive(Deserialize)]
struct IssueCreatePayload {
    issue: Option<CreatedIssueRaw>,
}

#[derive(Deserialize)]
struct CreatedIssueRaw {
    id: String,
    identifier: String,
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueRaw {
    id: String,
    identifier: String,
    title: String,
    description: Option<String>,
    priority: f64,
    priority_label: String,
    url: String,
    created_at: String,
    updated_at: String,
    due_date: Option<String>,
    estimate: Option<f64>,
    state: Option<IssueState>,
    assignee: Option<User>,
    labels: Nodes<Label>,
}

#[derive(Deserialize)]
struct IssueCommentsRaw {
    comments: Nodes<IssueComment>,
}

// ---------------------------------------------------------------------------
// LinearClient
// ---------------------------------------------------------------------------

/// Team-scoped defaults applied to issues created through the client.
#[derive(Debug, Clone, Default)]
pub struct TeamDefaults {
    pub team_id: String,
    pub project_id: Option<String>,
    pub label_id: Option<String>,
}

pub struct LinearClient {
    http: Client,
    api_url: String,
    api_key: String,
    team: Option<TeamDefaults>,
}

impl LinearClient {
    pub fn new(api_key: &str, api_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExportError::wrap("Failed to build Linear HTTP client", e))?;
        Ok(Self {
            http,
            api_url: api_url.unwrap_or(DEFAULT_LINEAR_API_URL).to_string(),
            api_key: api_key.to_string(),
            team: None,
        })
    }

    pub fn with_team(mut self, team: TeamDefaults) -> Self {
        self.team = Some(team);
        self
    }

    fn comment_create(
        &self,
        issue_id: &str,
        body: &str,
    ) -> std::result::Result<String, LinearError> {
        let payload: CommentCreatePayload = self.graphql(
            COMMENT_CREATE,
            json!({ "input": { "issueId": issue_id, "body": body } }),
            "commentCreate",
        )?;
        if !payload.success {
            return Err(LinearError::Unexpected(
                "Linear API returned success=false".to_string(),
            ));
        }
        payload.comment.map(|c| c.id).ok_or_else(|| {
            LinearError::Unexpected("comment was created but could not be retrieved".to_string())
        })
    }

    fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> std::result::Result<T, LinearError> {
        let resp = self
            .http
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(LinearError::Status {
                status: status.to_string(),
                body,
            });
        }

        let parsed: GraphQlResponse = resp.json()?;
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(LinearError::GraphQl(messages.join("; ")));
        }
        let payload = parsed
            .data
            .and_then(|mut d| d.get_mut(field).map(Value::take))
            .filter(|v| !v.is_null())
            .ok_or_else(|| LinearError::Unexpected(format!("response missing '{field}'")))?;
        serde_json::from_value(payload)
            .map_err(|e| LinearError::Unexpected(format!("malformed '{field}' payload: {e}")))
    }

    /// Request a pre-signed upload slot for a file.
    pub fn request_upload(
        &self,
        content_type: &str,
        filename: &str,
        size_bytes: u64,
    ) -> Result<UploadTarget> {
        let payload: FileUploadPayload = self
            .graphql(
                FILE_UPLOAD,
                json!({ "contentType": content_type, "filename": filename, "size": size_bytes }),
                "fileUpload",
            )
            .map_err(|e| ExportError::wrap("Failed to request upload URL from Linear", e))?;
        payload.upload_file.ok_or_else(|| {
            ExportError::wrap(
                "Failed to request upload URL from Linear",
                "no uploadFile in response",
            )
        })
    }

    /// PUT `bytes` to a slot from [`LinearClient::request_upload`].
    pub fn put_upload(&self, target: &UploadTarget, content_type: &str, bytes: &[u8]) -> Result<()> {
        let mut req = self.http.put(&target.upload_url).timeout(UPLOAD_TIMEOUT);
        for h in &target.headers {
            if !h.key.eq_ignore_ascii_case("content-type") {
                req = req.header(h.key.as_str(), h.value.as_str());
            }
        }
        let resp = req
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .map_err(|e| ExportError::wrap("Failed to upload zip to Linear", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ExportError::wrap(
                "Failed to upload zip to Linear",
                LinearError::Status {
                    status: status.to_string(),
                    body,
                },
            ));
        }
        Ok(())
    }
}

impl IssueTracker for LinearClient {
    fn create_feature_request(&self, request: &FeatureRequest) -> Result<CreatedIssue> {
        let team = self
            .team
            .as_ref()
            .ok_or_else(|| ExportError::Config("LINEAR_TEAM_ID is required".to_string()))?;

        let mut input = json!({
            "teamId": team.team_id,
            "title": request.title,
            "description": format!("## Reason\n\n{}", request.reason),
            "priority": request.priority.value(),
        });
        if let Some(project) = &team.project_id {
            input["projectId"] = json!(project);
        }
        if let Some(label) = &team.label_id {
            input["labelIds"] = json!([label]);
        }

        let payload: IssueCreatePayload = self
            .graphql(ISSUE_CREATE, json!({ "input": input }), "issueCreate")
            .map_err(|e| ExportError::wrap("Failed to create Linear issue", e))?;
        let issue = payload.issue.ok_or_else(|| {
            ExportError::wrap("Failed to create Linear issue", "no issue in response")
        })?;
        Ok(CreatedIssue {
            issue_id: issue.id,
            issue_identifier: issue.identifier,
            issue_url: issue.url,
        })
    }

    fn get_issue(&self, issue_id: &str) -> Result<IssueDetails> {
        let raw: IssueRaw = self
            .graphql(ISSUE, json!({ "id": issue_id }), "issue")
            .map_err(|e| ExportError::wrap(format!("Failed to fetch issue {issue_id}"), e))?;
        let state = raw.state.ok_or_else(|| {
            ExportError::wrap(
                format!("Failed to fetch issue {issue_id}"),
                "Failed to fetch issue state",
            )
        })?;
        Ok(IssueDetails {
            id: raw.id,
            identifier: raw.identifier,
            title: raw.title,
            description: raw.description,
            state,
            priority: raw.priority,
            priority_label: raw.priority_label,
            labels: raw.labels.nodes,
            assignee: raw.assignee,
            url: raw.url,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            due_date: raw.due_date,
            estimate: raw.estimate,
        })
    }

    fn create_comment(&self, issue_id: &str, body: &str) -> Result<String> {
        self.comment_create(issue_id, body)
            .map_err(|e| ExportError::wrap("Failed to create comment on Linear issue", e))
    }

    fn get_issue_comments(&self, issue_id: &str) -> Result<Vec<IssueComment>> {
        let raw: IssueCommentsRaw = self
            .graphql(ISSUE_COMMENTS, json!({ "id": issue_id }), "issue")
            .map_err(|e| {
                ExportError::wrap(format!("Failed to fetch comments for issue {issue_id}"), e)
            })?;
        Ok(raw.comments.nodes)
    }
}

impl Notifier for LinearClient {
    fn post(&self, issue_id: &str, body: &str) -> Result<()> {
        tracing::debug!(issue_id, "posting comment");
        // Callers name the comment they were posting.
        self.comment_create(issue_id, body)?;
        Ok(())
    }
}
