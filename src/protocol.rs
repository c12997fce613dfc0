//! JSON-RPC envelope handling around [`EmailAgent`].
//!
//! Malformed requests are rejected here before the agent runs; everything
//! past validation yields a task result, completed or failed.

use crate::a2a::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, MessageSendParams, PARSE_ERROR,
};
use crate::agent::EmailAgent;
use serde_json::Value;

pub const SEND_METHOD: &str = "message/send";

pub async fn handle_rpc(agent: &EmailAgent, body: &[u8]) -> JsonRpcResponse {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable request body");
            return JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, "Parse error").with_details(e.to_string()),
            );
        }
    };

    let echo_id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => return invalid_request(echo_id, e.to_string()),
    };

    let id = match request.id {
        Some(id) if !id.is_null() => id,
        _ => return invalid_request(Value::Null, "missing request id"),
    };
    if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return invalid_request(id, "jsonrpc must be \"2.0\"");
    }

    if let Some(method) = request.method.as_deref() {
        if method != SEND_METHOD {
            return JsonRpcResponse::failure(
                id,
                JsonRpcError::new(METHOD_NOT_FOUND, "Method not found").with_details(method),
            );
        }
    }

    let params: MessageSendParams = match serde_json::from_value(request.params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::failure(
                id,
                JsonRpcError::new(INVALID_PARAMS, "Invalid params").with_details(e.to_string()),
            );
        }
    };

    let user_text = params.message.first_text().to_string();
    let task_id = params.message.task_id.clone();
    let context_id = params
        .context_id
        .clone()
        .or_else(|| params.message.context_id.clone());

    let result = agent
        .process_message(&user_text, params.message, task_id, context_id)
        .await;

    JsonRpcResponse::success(id, result)
}

fn invalid_request(id: Value, details: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::failure(
        id,
        JsonRpcError::new(INVALID_REQUEST, "Invalid Request").with_details(details),
    )
}

/// Last-resort reply when a response could not be produced at all.
pub fn internal_error(id: Value, details: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::failure(
        id,
        JsonRpcError::new(INTERNAL_ERROR, "Internal error").with_details(details),
    )
}
