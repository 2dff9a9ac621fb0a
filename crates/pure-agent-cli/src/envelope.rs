use serde::Serialize;
use serde_json::{json, Value};

/// Side-channel data for post-call hooks. Never sent to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolMeta {
    pub issue_id: Option<String>,
}

impl ToolMeta {
    pub fn issue(id: impl Into<String>) -> Self {
        Self {
            issue_id: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: String,
}

/// The result of one tool call as the client sees it, plus hook metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(skip)]
    pub meta: Option<ToolMeta>,
}

impl ResponseEnvelope {
    /// Pretty-printed JSON payload.
    pub fn success(data: &Value, meta: Option<ToolMeta>) -> Self {
        let text = serde_json::to_string_pretty(data)
            .unwrap_or_else(|e| format!("serialization error: {e}"));
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error: false,
            meta,
        }
    }

    /// `{"success":false,"error":<message>}`, compact.
    pub fn error(message: &str) -> Self {
        let text = json!({ "success": false, "error": message }).to_string();
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error: true,
            meta: None,
        }
    }

    pub fn issue_id(&self) -> Option<&str> {
        self.meta.as_ref()?.issue_id.as_deref()
    }

    /// The client-facing form with metadata removed.
    pub fn stripped(mut self) -> Self {
        self.meta = None;
        self
    }

    pub fn text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or_default()
    }
}
