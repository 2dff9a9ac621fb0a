use crate::hooks::{default_hooks, PostToolHook};
use crate::tools::{self, AgentTool, ToolContext};
use pure_agent_core::services::linear::TeamDefaults;
use pure_agent_core::services::{LinearClient, LocalFs, SessionFile, SystemRunner};
use pure_agent_core::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let linear = LinearClient::new(config.linear_api_key()?, config.linear_api_url.as_deref())?
        .with_team(TeamDefaults {
            team_id: config.linear_team_id()?.to_string(),
            project_id: config.linear_default_project_id.clone(),
            label_id: config.linear_default_label_id.clone(),
        });
    let session = SessionFile::in_work_dir(&config.work_dir);
    let ctx = ToolContext {
        work_dir: &config.work_dir,
        issues: &linear,
        session: &session,
        runner: &SystemRunner,
        fs: &LocalFs,
    };
    let tools = tools::all_tools();
    let hooks = default_hooks();

    tracing::info!(
        work_dir = %config.work_dir.display(),
        tools = tools.len(),
        "tool server listening on stdio"
    );
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), stdout.lock(), &tools, &hooks, &ctx)
}

/// Read newline-delimited requests from `input` until EOF, answering each on
/// `output`. Notifications get no response. Lines that are not UTF-8 are
/// decoded lossily and answered with a parse error.
pub fn serve<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    tools: &[Box<dyn AgentTool>],
    hooks: &[Box<dyn PostToolHook>],
    ctx: &ToolContext<'_>,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }

        let raw: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let resp = JsonRpcResponse::err(None, -32700, format!("parse error: {e}"));
                respond(&mut output, &resp)?;
                continue;
            }
        };

        if !raw.as_object().is_some_and(|o| o.contains_key("id")) {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse::err(None, -32600, format!("invalid request: {e}"));
                respond(&mut output, &resp)?;
                continue;
            }
        };

        let response = handle_request(&request, tools, hooks, ctx);
        respond(&mut output, &response)?;
    }

    tracing::info!("stdin closed, tool server exiting");
    Ok(())
}

fn respond<W: Write>(output: &mut W, resp: &JsonRpcResponse) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *output, resp)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

pub fn handle_request(
    req: &JsonRpcRequest,
    tools: &[Box<dyn AgentTool>],
    hooks: &[Box<dyn PostToolHook>],
    ctx: &ToolContext<'_>,
) -> JsonRpcResponse {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => JsonRpcResponse::ok(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "pure-agent",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let tool_list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name(),
                        "description": t.description(),
                        "inputSchema": t.schema()
                    })
                })
                .collect();
            JsonRpcResponse::ok(id, json!({ "tools": tool_list }))
        }

        "tools/call" => {
            let Some(params) = &req.params else {
                return JsonRpcResponse::err(id, -32602, "missing params");
            };
            let Some(tool_name) = params["name"].as_str() else {
                return JsonRpcResponse::err(id, -32602, "missing tool name in params");
            };
            let args = params.get("arguments").cloned().unwrap_or(Value::Null);

            let envelope = tools::dispatch(tools, hooks, tool_name, args, ctx);
            match serde_json::to_value(&envelope) {
                Ok(result) => JsonRpcResponse::ok(id, result),
                Err(e) => JsonRpcResponse::err(id, -32603, format!("serialization error: {e}")),
            }
        }

        other => JsonRpcResponse::err(id, -32601, format!("method not found: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeSession, Harness};

    fn make_req(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(Value::Number(id.into())),
            method: method.to_string(),
            params,
        }
    }

    fn call(h: &Harness, req: &JsonRpcRequest) -> JsonRpcResponse {
        handle_request(req, &tools::all_tools(), &default_hooks(), &h.ctx())
    }

    #[test]
    fn initialize_returns_capabilities() {
        let h = Harness::default();
        let resp = call(&h, &make_req(1, "initialize", Some(json!({}))));
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(result["serverInfo"]["name"], "pure-agent");
    }

    #[test]
    fn tools_list_returns_all_six() {
        let h = Harness::default();
        let resp = call(&h, &make_req(2, "tools/list", Some(json!({}))));
        let result = resp.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "request_feature",
                "get_export_actions",
                "set_export_config",
                "get_issue",
                "get_issue_comments",
                "git_clone"
            ]
        );
        assert_eq!(result["tools"][0]["inputSchema"]["type"], "object");
    }

    #[test]
    fn tools_call_unknown_tool_is_error_envelope() {
        let h = Harness::default();
        let resp = call(
            &h,
            &make_req(3, "tools/call", Some(json!({ "name": "nope", "arguments": {} }))),
        );
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Tool not found: nope"));
    }

    #[test]
    fn tools_call_success_hides_metadata() {
        let mut h = Harness::default();
        h.session = FakeSession(Some("sess-9".into()));
        let resp = call(
            &h,
            &make_req(
                4,
                "tools/call",
                Some(json!({ "name": "get_issue", "arguments": { "issue_id": "PA-42" } })),
            ),
        );
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result.as_object().unwrap().len(), 2);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"identifier\": \"PA-42\""));
        assert_eq!(h.tracker.comments.borrow()[0].0, "uuid-PA-42");
    }

    #[test]
    fn unknown_method_returns_method_not_found() {
        let h = Harness::default();
        let resp = call(&h, &make_req(6, "unknown/method", None));
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("method not found"));
    }

    #[test]
    fn tools_call_missing_params_returns_error() {
        let h = Harness::default();
        let resp = call(&h, &make_req(7, "tools/call", None));
        assert_eq!(resp.error.unwrap().code, -32602);
    }

    #[test]
    fn serve_skips_notifications_and_reports_parse_errors() {
        let h = Harness::default();
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "\n",
            "not json\n",
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
        );
        let mut out = Vec::new();
        serve(
            input.as_bytes(),
            &mut out,
            &tools::all_tools(),
            &default_hooks(),
            &h.ctx(),
        )
        .unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], -32700);
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn serve_survives_invalid_utf8() {
        let h = Harness::default();
        let input: &[u8] =
            b"\xff\xfe garbage\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n";
        let mut out = Vec::new();
        serve(
            input,
            &mut out,
            &tools::all_tools(),
            &default_hooks(),
            &h.ctx(),
        )
        .unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], -32700);
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["result"]["serverInfo"]["name"], "pure-agent");
    }
}
