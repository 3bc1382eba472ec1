//! Line loop over stdin/stdout
//!
//! One line read, one dispatch, at most one line written, flushed before the
//! next read. The loop survives any malformed input; it ends only on
//! end-of-stream or interrupt.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{error, info};

use crate::mcp::rpc::json_rpc_error;
use crate::mcp::server::handle_json_rpc_value;
use crate::AppState;

pub async fn run(state: AppState) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("interrupt received, shutting down");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Some(response) = dispatch_line(&state, &line).await {
                        write_line(&mut stdout, &response).await?;
                    }
                }
                Ok(None) => {
                    info!("input stream closed, shutting down");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "failed to read from input stream");
                    break;
                }
            },
        }
    }

    Ok(())
}

/// Decode one non-blank input line and dispatch it. Malformed JSON yields a
/// parse-error envelope (no id is recoverable from an unparseable line)
/// instead of ending the session.
pub async fn dispatch_line(state: &AppState, line: &str) -> Option<Value> {
    let payload: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "invalid json on input stream");
            return Some(json_rpc_error(None, -32700, "Parse error"));
        }
    };

    handle_json_rpc_value(state, payload).await
}

async fn write_line(stdout: &mut Stdout, response: &Value) -> std::io::Result<()> {
    let mut payload = response.to_string();
    payload.push('\n');
    stdout.write_all(payload.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::dispatch_line;
    use crate::library::DocumentLibrary;
    use crate::AppState;

    fn state() -> AppState {
        AppState::new(Arc::new(DocumentLibrary::from_parts(
            BTreeMap::new(),
            BTreeMap::new(),
        )))
    }

    #[tokio::test]
    async fn malformed_line_yields_parse_error_and_session_continues() {
        let state = state();

        let response = dispatch_line(&state, "{not json")
            .await
            .expect("parse error envelope");
        assert_eq!(response["error"]["code"], -32700);

        // The next valid line is still answered.
        let response = dispatch_line(&state, r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#)
            .await
            .expect("ping response");
        assert_eq!(response["id"], 7);
        assert!(response.get("result").is_some());
    }

    #[tokio::test]
    async fn notification_line_produces_no_output() {
        let state = state();

        let response = dispatch_line(&state, r#"{"method":"notifications/initialized"}"#).await;
        assert!(response.is_none());
    }
}
