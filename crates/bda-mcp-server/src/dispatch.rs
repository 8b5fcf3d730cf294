//! Transport-agnostic MCP request dispatcher.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::protocol::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo,
    negotiate_protocol_version,
};
use crate::tool::{ToolCallError, ToolRegistry};

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(default, rename = "protocolVersion")]
    protocol_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Routes JSON-RPC messages to the tool registry.
///
/// Shared behind an `Arc` by every transport; holds no mutable state, so
/// concurrent requests need no coordination.
pub struct McpServer {
    info: ServerInfo,
    instructions: Option<String>,
    tools: ToolRegistry,
}

impl McpServer {
    pub fn new(info: ServerInfo, tools: ToolRegistry) -> Self {
        Self {
            info,
            instructions: None,
            tools,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle one raw message. Returns the serialised response, or `None`
    /// when the message was a notification.
    pub async fn handle_message(&self, raw: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(raw) {
            Err(err) => Some(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::parse_error(err),
            )),
            Ok(value) => self.handle_value(value).await,
        };

        response.map(|resp| match serde_json::to_string(&resp) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(%err, "failed to serialize JSON-RPC response");
                json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "id": resp.id,
                    "error": { "code": crate::protocol::INTERNAL_ERROR, "message": "response serialization failed" }
                })
                .to_string()
            }
        })
    }

    async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
        if value.is_array() {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::invalid_request("batch requests are not supported"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                return Some(JsonRpcResponse::failure(
                    id_hint,
                    JsonRpcError::invalid_request(format!("invalid request: {err}")),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return request.id.map(|id| {
                JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
                )
            });
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(value) => serde_json::from_value(value)
                .map_err(|err| JsonRpcError::invalid_params(err.to_string()))?,
            None => InitializeParams {
                protocol_version: None,
            },
        };
        let version = negotiate_protocol_version(params.protocol_version.as_deref());
        tracing::info!(protocol_version = version, "client initialized session");

        let mut result = json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": self.info,
        });
        if let Some(instructions) = &self.instructions {
            result["instructions"] = Value::String(instructions.clone());
        }
        Ok(result)
    }

    fn list_tools(&self) -> Value {
        json!({ "tools": self.tools.definitions() })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|err| JsonRpcError::invalid_params(err.to_string()))?;

        tracing::debug!(tool = %params.name, "tool call");
        let result = self
            .tools
            .call(&params.name, params.arguments)
            .await
            .map_err(|err| match err {
                ToolCallError::UnknownTool(_) | ToolCallError::InvalidArguments { .. } => {
                    JsonRpcError::invalid_params(err.to_string())
                }
            })?;

        if result.is_error() {
            tracing::warn!(tool = %params.name, "tool reported an error");
        }

        serde_json::to_value(&result).map_err(|err| JsonRpcError::internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
    use crate::tool::{NoArguments, Tool, ToolResult};
    use async_trait::async_trait;

    struct Fails;

    #[async_trait]
    impl Tool for Fails {
        type Args = NoArguments;
        const NAME: &'static str = "fails";
        const DESCRIPTION: &'static str = "Always reports an error";

        async fn call(&self, _args: NoArguments) -> ToolResult {
            ToolResult::error("Error: upstream unavailable")
        }
    }

    fn server() -> McpServer {
        let mut tools = ToolRegistry::new();
        tools.register(Fails).expect("registers");
        McpServer::new(ServerInfo::new("test", "0.0.1"), tools).with_instructions("be nice")
    }

    async fn roundtrip(server: &McpServer, message: Value) -> Value {
        let raw = server
            .handle_message(&message.to_string())
            .await
            .expect("request expects a response");
        serde_json::from_str(&raw).expect("response is JSON")
    }

    #[tokio::test]
    async fn initialize_reports_capabilities_and_identity() {
        let resp = roundtrip(
            &server(),
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize",
                    "params": { "protocolVersion": "2024-11-05", "capabilities": {} } }),
        )
        .await;
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(resp["result"]["serverInfo"]["name"], "test");
        assert_eq!(resp["result"]["instructions"], "be nice");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let out = server()
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn tool_errors_stay_in_band() {
        let resp = roundtrip(
            &server(),
            json!({ "jsonrpc": "2.0", "id": "c1", "method": "tools/call",
                    "params": { "name": "fails" } }),
        )
        .await;
        assert!(resp.get("error").is_none());
        assert_eq!(resp["id"], "c1");
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(
            resp["result"]["content"][0]["text"],
            "Error: upstream unavailable"
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let resp = roundtrip(
            &server(),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                    "params": { "name": "missing", "arguments": {} } }),
        )
        .await;
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn protocol_faults_use_standard_codes() {
        let srv = server();
        let raw = srv.handle_message("{not json").await.expect("response");
        let parsed: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(parsed["error"]["code"], PARSE_ERROR);

        let resp = roundtrip(&srv, json!({ "jsonrpc": "2.0", "id": 3, "method": "nope" })).await;
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);

        let resp = roundtrip(&srv, json!([{ "jsonrpc": "2.0", "id": 4, "method": "ping" }])).await;
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);

        let resp = roundtrip(&srv, json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" })).await;
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn tools_list_and_ping() {
        let srv = server();
        let resp = roundtrip(&srv, json!({ "jsonrpc": "2.0", "id": 6, "method": "tools/list" })).await;
        assert_eq!(resp["result"]["tools"][0]["name"], "fails");
        assert_eq!(resp["result"]["tools"][0]["inputSchema"]["type"], "object");

        let resp = roundtrip(&srv, json!({ "jsonrpc": "2.0", "id": 7, "method": "ping" })).await;
        assert_eq!(resp["result"], json!({}));
    }
}
