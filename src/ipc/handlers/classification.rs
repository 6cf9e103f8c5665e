use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::Classification;
use crate::store::{CommitOutcome, PublishedView};

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn published_view<'a>(
    state: &'a AppState,
    req: &Request,
    code: &str,
) -> Result<&'a PublishedView, serde_json::Value> {
    state.store.view(code).ok_or_else(|| {
        // A failed refresh may have left a structural error without ever
        // publishing; report that in preference to a generic miss.
        match state.store.last_error(code) {
            Some(e) => err(&req.id, e.code(), e.to_string(), None),
            None => err(
                &req.id,
                "unknown_course",
                format!("no published snapshot for {}", code),
                None,
            ),
        }
    })
}

fn handle_refresh_begin(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "courseCode") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let token = state.store.begin_refresh(&code);
    ok(&req.id, json!({ "snapshotId": token.to_string() }))
}

fn handle_refresh_commit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "courseCode") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let token = match required_str(req, "snapshotId") {
        Ok(raw) => match Uuid::parse_str(&raw) {
            Ok(t) => t,
            Err(e) => return err(&req.id, "bad_params", format!("bad snapshotId: {}", e), None),
        },
        Err(resp) => return resp,
    };
    let records: Vec<Classification> = match req.params.get("classifications") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(r) => r,
            Err(e) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("bad classifications: {}", e),
                    None,
                )
            }
        },
        None => return err(&req.id, "bad_params", "missing classifications", None),
    };

    match state.store.commit_refresh(&code, token, records) {
        Ok(CommitOutcome::Published) => match state.store.view(&code) {
            Some(view) => ok(
                &req.id,
                json!({
                    "committed": true,
                    "groups": view.groups,
                    "finalValue": view.final_value,
                    "fetchedAt": view.fetched_at.to_rfc3339(),
                }),
            ),
            None => err(&req.id, "internal", "published view missing", None),
        },
        Ok(CommitOutcome::Superseded) => ok(
            &req.id,
            json!({ "committed": false, "superseded": true }),
        ),
        Err(e) => {
            let retained = state.store.view(&code).is_some();
            err(
                &req.id,
                e.code(),
                e.to_string(),
                Some(json!({
                    "courseCode": code,
                    "previousViewRetained": retained,
                })),
            )
        }
    }
}

fn handle_groups(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "courseCode") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let view = match published_view(state, req, &code) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "groups": view.groups,
            "fetchedAt": view.fetched_at.to_rfc3339(),
        }),
    )
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "courseCode") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let view = match published_view(state, req, &code) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let item_count: usize = view.groups.iter().map(|g| g.items.len()).sum();
    ok(
        &req.id,
        json!({
            "finalValue": view.final_value,
            "groupCount": view.groups.len(),
            "itemCount": item_count,
            "recordCount": view.records.len(),
            "fetchedAt": view.fetched_at.to_rfc3339(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classification.refreshBegin" => Some(handle_refresh_begin(state, req)),
        "classification.refreshCommit" => Some(handle_refresh_commit(state, req)),
        "classification.groups" => Some(handle_groups(state, req)),
        "classification.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
