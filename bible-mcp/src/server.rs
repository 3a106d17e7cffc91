use crate::tools::{call_tool, tools_list};
use bible_core::{BibleClient, Transport};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::debug;

const PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];
const FALLBACK_PROTOCOL: &str = "2024-11-05";

#[derive(Deserialize)]
struct Request {
    /// `None` only when the key is absent; `"id": null` is still a request.
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

fn reply(id: Value, result: Value) -> Value {
    json!({"jsonrpc":"2.0","id":id,"result":result})
}

fn error(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({"jsonrpc":"2.0","id":id,"error":{"code":code,"message":message.into()}})
}

pub fn parse_error(detail: &str) -> Value {
    error(Value::Null, -32700, format!("Parse error: {}", detail))
}

fn handle_initialize(id: Value, params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(|v| v.as_str()).unwrap_or("");
    let version = PROTOCOL_VERSIONS.iter().find(|v| **v == requested).copied().unwrap_or(FALLBACK_PROTOCOL);
    reply(id, json!({
        "protocolVersion": version,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": "bible-mcp", "version": env!("CARGO_PKG_VERSION") }
    }))
}

fn handle_call<T: Transport>(client: &BibleClient<T>, id: Value, params: &Value) -> Value {
    let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
    match call_tool(client, name, args) {
        Ok(out) => reply(id, out.into_result()),
        Err(e) => error(id, -32602, e.to_string()),
    }
}

/// Answer one decoded message. `None` for notifications and responses.
pub fn handle_message<T: Transport>(client: &BibleClient<T>, msg: Value) -> Option<Value> {
    let req = match serde_json::from_value::<Request>(msg) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "ignoring non-request message");
            return None;
        }
    };
    let Some(id) = req.id else {
        debug!(method = %req.method, "notification");
        return None;
    };
    debug!(method = %req.method, id = %id, "request");
    Some(match req.method.as_str() {
        "initialize" => handle_initialize(id, &req.params),
        "ping" => reply(id, json!({})),
        "tools/list" => reply(id, json!({"tools": tools_list()})),
        "tools/call" => handle_call(client, id, &req.params),
        other => error(id, -32601, format!("Method not found: {}", other)),
    })
}
