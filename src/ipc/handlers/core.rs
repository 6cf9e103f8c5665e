use serde_json::json;
use tracing::debug;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::DynamicValue;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "rosterLoaded": state.roster.is_some(),
        }),
    )
}

/// Locale-tolerant numeric parsing for dynamic value input ("3,5" -> 3.5).
/// Unresolvable text degrades to a null value; it is never an error.
fn handle_parse_number(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    match DynamicValue::parse_number(text) {
        Some(n) => ok(&req.id, json!({ "value": n })),
        None => {
            debug!(text = %text, "numeric input did not resolve");
            ok(&req.id, json!({ "value": null }))
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "value.parseNumber" => Some(handle_parse_number(state, req)),
        _ => None,
    }
}
