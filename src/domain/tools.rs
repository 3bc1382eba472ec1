//! Interactive tools exposed via Model Context Protocol
//!
//! Five operations over the document corpus: discovery, fetch, summary,
//! search, and template rendering. Handlers return `Result`; the mapping to
//! protocol error envelopes happens once in `mcp::rpc`.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::render::render;
use crate::domain::utils::{
    extract_title, format_size, normalize_keyword, normalize_namespace, normalize_summary_limit,
    summarize,
};
use crate::library::{DocumentLibrary, Namespace};
use crate::mcp::rpc::{app_error_to_json_rpc, json_rpc_error_with_data, json_rpc_result};
use crate::{errors::AppError, AppState};

#[macros::mcp_tool(
    name = "list_documents",
    description = "List available documents in a namespace (practices or templates) with titles and sizes"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListDocumentsTool {
    #[serde(default)]
    pub namespace: String,
}

#[macros::mcp_tool(
    name = "get_document",
    description = "Get a document by name from a namespace (practices or templates)"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetDocumentTool {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
}

#[macros::mcp_tool(
    name = "get_document_summary",
    description = "Get the beginning of a practice document (default 500 characters)"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetDocumentSummaryTool {
    #[serde(default)]
    pub name: String,
    pub max_chars: Option<u32>,
}

#[macros::mcp_tool(
    name = "search_documents",
    description = "Search practices and templates for a keyword in document names and content"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SearchDocumentsTool {
    #[serde(default)]
    pub keyword: String,
}

#[macros::mcp_tool(
    name = "render_template",
    description = "Render a template with variable substitution. Supports ${VAR} and $VAR formats. Auto-provides DATE, TIMESTAMP, USER, YEAR."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct RenderTemplateTool {
    #[serde(default)]
    pub name: String,
    pub variables: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub title: String,
    pub size: String,
}

#[derive(Debug, Serialize)]
pub struct SearchMatch {
    pub namespace: &'static str,
    pub name: String,
    pub title: String,
}

pub fn build_tools_list() -> Vec<Tool> {
    vec![
        ListDocumentsTool::tool(),
        GetDocumentTool::tool(),
        GetDocumentSummaryTool::tool(),
        SearchDocumentsTool::tool(),
        RenderTemplateTool::tool(),
    ]
}

pub async fn handle_tools_call(
    state: &AppState,
    id: Option<Value>,
    tool_call: CallToolRequestParams,
) -> Value {
    let arguments = json!(tool_call.arguments.unwrap_or_default());

    let outcome = match tool_call.name.as_str() {
        "list_documents" => {
            decode(arguments).and_then(|args| list_documents(&state.library, args))
        }
        "get_document" => decode(arguments).and_then(|args| get_document(&state.library, args)),
        "get_document_summary" => {
            decode(arguments).and_then(|args| get_document_summary(&state.library, args))
        }
        "search_documents" => {
            decode(arguments).and_then(|args| search_documents(&state.library, args))
        }
        "render_template" => {
            decode(arguments).and_then(|args| render_template(&state.library, args))
        }
        _ => {
            return json_rpc_error_with_data(
                id,
                -32601,
                "Method not found",
                Some(json!({
                    "code": "tool_not_found",
                    "message": "unknown tool name",
                    "details": {
                        "name": tool_call.name,
                    },
                })),
            )
        }
    };

    match outcome {
        Ok(result) => json_rpc_result(
            id,
            serde_json::to_value(result).expect("tool result serialization"),
        ),
        Err(err) => app_error_to_json_rpc(id, err),
    }
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments).map_err(|_| {
        AppError::bad_request(
            "invalid_arguments",
            "tool arguments do not match the declared schema",
        )
    })
}

fn list_documents(
    library: &DocumentLibrary,
    args: ListDocumentsTool,
) -> Result<CallToolResult, AppError> {
    let namespace = normalize_namespace(&args.namespace)?;

    let documents: Vec<DocumentInfo> = library
        .entries(namespace)
        .map(|(name, content)| DocumentInfo {
            name: name.to_string(),
            title: extract_title(name, content),
            size: format_size(content.len()),
        })
        .collect();

    let text = if documents.is_empty() {
        format!("No {namespace} are loaded")
    } else {
        let listing: Vec<String> = documents
            .iter()
            .map(|document| format!("- {} ({})", document.name, document.title))
            .collect();
        format!("Available {namespace}:\n{}", listing.join("\n"))
    };

    let total = documents.len();
    let generated_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    Ok(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content: Some(serde_json::Map::from_iter([
            ("documents".to_string(), json!(documents)),
            ("total".to_string(), json!(total)),
            ("namespace".to_string(), json!(namespace.as_str())),
            ("generated_at_utc".to_string(), json!(generated_at_utc)),
        ])),
    })
}

fn get_document(
    library: &DocumentLibrary,
    args: GetDocumentTool,
) -> Result<CallToolResult, AppError> {
    let namespace = normalize_namespace(&args.namespace)?;

    let content = library
        .get(namespace, &args.name)
        .ok_or_else(|| document_not_found(library, namespace, &args.name))?;

    Ok(text_result(content.to_string()))
}

fn get_document_summary(
    library: &DocumentLibrary,
    args: GetDocumentSummaryTool,
) -> Result<CallToolResult, AppError> {
    let max_chars = normalize_summary_limit(args.max_chars)?;

    let content = library
        .get(Namespace::Practices, &args.name)
        .ok_or_else(|| document_not_found(library, Namespace::Practices, &args.name))?;

    Ok(text_result(summarize(content, max_chars)))
}

fn search_documents(
    library: &DocumentLibrary,
    args: SearchDocumentsTool,
) -> Result<CallToolResult, AppError> {
    let keyword = normalize_keyword(&args.keyword)?;
    let needle = keyword.to_lowercase();

    let mut matches = Vec::new();
    for namespace in Namespace::ALL {
        for (name, content) in library.entries(namespace) {
            if name.to_lowercase().contains(&needle) || content.to_lowercase().contains(&needle) {
                matches.push(SearchMatch {
                    namespace: namespace.as_str(),
                    name: name.to_string(),
                    title: extract_title(name, content),
                });
            }
        }
    }

    let text = if matches.is_empty() {
        format!("No documents matched keyword: {keyword}")
    } else {
        let listing: Vec<String> = matches
            .iter()
            .map(|found| format!("- [{}] {} ({})", found.namespace, found.name, found.title))
            .collect();
        format!("Documents matching '{keyword}':\n{}", listing.join("\n"))
    };

    let total = matches.len();

    Ok(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content: Some(serde_json::Map::from_iter([
            ("matches".to_string(), json!(matches)),
            ("total".to_string(), json!(total)),
            ("keyword".to_string(), json!(keyword)),
        ])),
    })
}

fn render_template(
    library: &DocumentLibrary,
    args: RenderTemplateTool,
) -> Result<CallToolResult, AppError> {
    let template = library
        .get(Namespace::Templates, &args.name)
        .ok_or_else(|| document_not_found(library, Namespace::Templates, &args.name))?;

    let overrides = args.variables.unwrap_or_default();
    Ok(text_result(render(template, &overrides)))
}

/// Domain not-found: the message enumerates every loaded name in the
/// namespace so the caller can self-correct without another round trip.
fn document_not_found(library: &DocumentLibrary, namespace: Namespace, name: &str) -> AppError {
    let available = library.names(namespace).join(", ");
    AppError::not_found(
        "document_not_found",
        format!(
            "{} not found: {}. Available: {}",
            namespace.label(),
            name,
            available
        ),
    )
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    }
}
