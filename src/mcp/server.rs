//! The central Model Context Protocol engine
//!
//! Decodes one JSON-RPC envelope, classifies it as request or notification,
//! routes requests through a closed method table, and produces at most one
//! response envelope per message.

use rust_mcp_sdk::schema::{
    CallToolRequestParams, Implementation, InitializeResult, ListToolsResult, ProtocolVersion,
    ServerCapabilities, ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::info;

use crate::domain::tools::{build_tools_list, handle_tools_call};
use crate::mcp::rpc::{is_json_rpc_error, json_rpc_error, json_rpc_result};
use crate::AppState;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

/// The closed method table. Classification happens once; every variant
/// carries its already-decoded parameters, so routing is an exhaustive match.
#[derive(Debug)]
pub enum McpRequest {
    Initialize,
    Ping,
    ToolsList,
    ToolsCall(CallToolRequestParams),
}

#[derive(Debug, PartialEq, Eq)]
pub enum MethodDecodeError {
    UnknownMethod,
    InvalidParams,
}

impl McpRequest {
    pub fn classify(method: &str, params: Option<Value>) -> Result<Self, MethodDecodeError> {
        match method {
            // initialize params (clientInfo, offered protocolVersion) are
            // accepted but not negotiated; the method requires no params.
            "initialize" => Ok(Self::Initialize),
            "ping" => Ok(Self::Ping),
            "tools/list" => Ok(Self::ToolsList),
            "tools/call" => {
                let params = params.ok_or(MethodDecodeError::InvalidParams)?;
                serde_json::from_value(params)
                    .map(Self::ToolsCall)
                    .map_err(|_| MethodDecodeError::InvalidParams)
            }
            _ => Err(MethodDecodeError::UnknownMethod),
        }
    }
}

/// Handle one decoded JSON value from the transport. Returns `None` when the
/// message is a notification: notifications never produce output.
pub async fn handle_json_rpc_value(state: &AppState, payload: Value) -> Option<Value> {
    let Value::Object(envelope) = payload else {
        return Some(json_rpc_error(None, -32600, "Invalid Request"));
    };

    let method = envelope
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = envelope.get("params").cloned();

    // Presence of `id` is what separates a request from a notification; the
    // `jsonrpc` version marker is not required on input.
    if !envelope.contains_key("id") {
        info!(method = %method, "notification received");
        return None;
    }

    let id = envelope.get("id").cloned();
    Some(handle_json_rpc_request(state, id, method, params).await)
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
) -> Value {
    let audit_params = redact_audit_params(params.as_ref());

    let response = match McpRequest::classify(&method, params) {
        Ok(McpRequest::Initialize) => json_rpc_result(
            id,
            serde_json::to_value(build_initialize_result())
                .expect("initialize result serialization"),
        ),
        Ok(McpRequest::Ping) => json_rpc_result(id, json!({})),
        Ok(McpRequest::ToolsList) => json_rpc_result(
            id,
            serde_json::to_value(ListToolsResult {
                meta: None,
                next_cursor: None,
                tools: build_tools_list(),
            })
            .expect("tools list result serialization"),
        ),
        Ok(McpRequest::ToolsCall(tool_call)) => handle_tools_call(state, id, tool_call).await,
        Err(MethodDecodeError::UnknownMethod) => json_rpc_error(id, -32601, "Method not found"),
        Err(MethodDecodeError::InvalidParams) => json_rpc_error(id, -32602, "Invalid params"),
    };

    info!(
        method = %method,
        params = %audit_params,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

fn build_initialize_result() -> InitializeResult {
    InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            resources: None,
            prompts: None,
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2024_11_05.into(),
        instructions: None,
        meta: None,
    }
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "token"
            | "api_token"
            | "access_token"
            | "refresh_token"
            | "authorization"
            | "bearer"
            | "password"
            | "secret"
            | "credentials"
            | "credential"
            | "api_key"
            | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{redact_audit_params, McpRequest, MethodDecodeError, SUPPORTED_PROTOCOL_VERSION};

    #[test]
    fn redacts_sensitive_fields_in_audit_params() {
        let params = json!({
            "name": "render_template",
            "arguments": {
                "name": "runbook-template",
                "variables": {
                    "PROJECT_NAME": "demo",
                    "api_token": "should-not-appear",
                    "DEPLOY_SECRET": "should-not-appear"
                }
            }
        });

        let redacted = redact_audit_params(Some(&params));

        assert_eq!(redacted["name"], json!("render_template"));
        assert_eq!(
            redacted["arguments"]["variables"]["PROJECT_NAME"],
            json!("demo")
        );
        assert_eq!(
            redacted["arguments"]["variables"]["api_token"],
            json!("[REDACTED]")
        );
        assert_eq!(
            redacted["arguments"]["variables"]["DEPLOY_SECRET"],
            json!("[REDACTED]")
        );
    }

    #[test]
    fn classify_covers_the_closed_method_table() {
        assert!(matches!(
            McpRequest::classify("initialize", None),
            Ok(McpRequest::Initialize)
        ));
        assert!(matches!(
            McpRequest::classify("tools/list", Some(json!({}))),
            Ok(McpRequest::ToolsList)
        ));
        assert_eq!(
            McpRequest::classify("resources/list", None).unwrap_err(),
            MethodDecodeError::UnknownMethod
        );
        assert_eq!(
            McpRequest::classify("tools/call", None).unwrap_err(),
            MethodDecodeError::InvalidParams
        );
        assert_eq!(
            McpRequest::classify("tools/call", Some(json!({"arguments": {}}))).unwrap_err(),
            MethodDecodeError::InvalidParams
        );
    }

    #[test]
    fn classified_tool_call_carries_its_params() {
        let request = McpRequest::classify(
            "tools/call",
            Some(json!({"name": "get_document", "arguments": {"namespace": "practices"}})),
        )
        .expect("tools/call should classify");

        match request {
            McpRequest::ToolsCall(params) => assert_eq!(params.name, "get_document"),
            other => panic!("expected ToolsCall, got {other:?}"),
        }
    }

    #[test]
    fn advertised_protocol_version_matches_wire_constant() {
        let result = super::build_initialize_result();
        assert_eq!(result.protocol_version, SUPPORTED_PROTOCOL_VERSION);
    }
}
