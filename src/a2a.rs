//! JSON-RPC 2.0 and A2A task types as they appear on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Everything is optional here so that validation can report precise errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
}

/// Keeps `"id": null` distinguishable from a missing id.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: TaskResult) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.data = Some(serde_json::json!({ "details": details.into() }));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    Data { data: Value },
    /// File parts and anything else this agent does not read.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "message_kind")]
    pub kind: String,
    #[serde(default = "user_role")]
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

fn message_kind() -> String {
    "message".to_string()
}

fn user_role() -> Role {
    Role::User
}

impl Message {
    pub fn agent_text(text: impl Into<String>, task_id: &str, context_id: &str) -> Self {
        Self {
            kind: message_kind(),
            role: Role::Agent,
            parts: vec![Part::Text { text: text.into() }],
            message_id: Some(uuid::Uuid::new_v4().to_string()),
            task_id: Some(task_id.to_string()),
            context_id: Some(context_id.to_string()),
        }
    }

    /// Text of the first text part, or "" when there is none.
    pub fn first_text(&self) -> &str {
        self.parts
            .iter()
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    pub name: String,
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn data(name: &str, data: Value) -> Self {
        Self {
            artifact_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            parts: vec![Part::Data { data }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    pub artifacts: Vec<Artifact>,
    pub history: Vec<Message>,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_id_differ() {
        let missing: JsonRpcRequest = serde_json::from_value(json!({"jsonrpc": "2.0"})).unwrap();
        assert_eq!(missing.id, None);

        let null: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": null})).unwrap();
        assert_eq!(null.id, Some(Value::Null));
    }

    #[test]
    fn test_message_parts_are_tagged_by_kind() {
        let msg: Message = serde_json::from_value(json!({
            "parts": [
                {"kind": "data", "data": {"x": 1}},
                {"kind": "text", "text": "check my emails"}
            ]
        }))
        .unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.first_text(), "check my emails");

        let out = serde_json::to_value(Message::agent_text("hi", "t1", "c1")).unwrap();
        assert_eq!(out["kind"], "message");
        assert_eq!(out["role"], "agent");
        assert_eq!(out["taskId"], "t1");
        assert_eq!(out["parts"][0], json!({"kind": "text", "text": "hi"}));
    }

    #[test]
    fn test_unknown_part_kinds_are_skipped() {
        let msg: Message = serde_json::from_value(json!({
            "parts": [
                {"kind": "file", "file": {"uri": "https://example.com/a.pdf"}},
                {"kind": "text", "text": "summarize my inbox"}
            ]
        }))
        .unwrap();
        assert_eq!(msg.parts[0], Part::Other);
        assert_eq!(msg.first_text(), "summarize my inbox");
    }

    #[test]
    fn test_error_details() {
        let err = JsonRpcError::new(INTERNAL_ERROR, "Internal error").with_details("boom");
        let out = serde_json::to_value(JsonRpcResponse::failure(json!(7), err)).unwrap();
        assert_eq!(
            out,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": {"code": -32603, "message": "Internal error", "data": {"details": "boom"}}
            })
        );
    }
}
