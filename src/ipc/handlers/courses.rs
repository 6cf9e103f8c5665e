use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{CourseRaw, CoursesByRoles, CoursesByRolesRaw};
use crate::roster;

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn current_roster<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a CoursesByRoles, serde_json::Value> {
    state
        .roster
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_roster", "load a roster first", None))
}

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roles: CoursesByRolesRaw = match req.params.get("roles") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(r) => r,
            Err(e) => return err(&req.id, "bad_params", format!("bad roles: {}", e), None),
        },
        None => return err(&req.id, "bad_params", "missing roles", None),
    };
    let hydrated: Vec<CourseRaw> = match req.params.get("courses") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(c) => c,
            Err(e) => return err(&req.id, "bad_params", format!("bad courses: {}", e), None),
        },
        None => return err(&req.id, "bad_params", "missing courses", None),
    };

    let merge = roster::merge_roster(&roles, &hydrated);
    state.roster = Some(merge.courses.clone());
    ok(
        &req.id,
        json!({
            "courses": merge.courses,
            "unmatched": merge.unmatched,
        }),
    )
}

fn handle_courses_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roster = match current_roster(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let hidden: Vec<String> = match req.params.get("hidden") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(h) => h,
            Err(e) => return err(&req.id, "bad_params", format!("bad hidden: {}", e), None),
        },
        None => state.hidden.clone(),
    };
    let filtered = roster::filter_hidden(roster, &hidden);
    ok(&req.id, json!({ "courses": filtered, "hidden": hidden }))
}

fn handle_set_hidden(state: &mut AppState, req: &Request) -> serde_json::Value {
    let hidden: Vec<String> = match req.params.get("hidden") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(h) => h,
            Err(e) => return err(&req.id, "bad_params", format!("bad hidden: {}", e), None),
        },
        None => return err(&req.id, "bad_params", "missing hidden", None),
    };
    state.hidden = hidden;
    ok(&req.id, json!({ "hidden": state.hidden }))
}

fn handle_hide(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "code") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if !state.hidden.contains(&code) {
        state.hidden.push(code);
    }
    ok(&req.id, json!({ "hidden": state.hidden }))
}

fn handle_show(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "code") {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    state.hidden.retain(|c| c != &code);
    ok(&req.id, json!({ "hidden": state.hidden }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.load" => Some(handle_roster_load(state, req)),
        "courses.list" => Some(handle_courses_list(state, req)),
        "courses.setHidden" => Some(handle_set_hidden(state, req)),
        "courses.hide" => Some(handle_hide(state, req)),
        "courses.show" => Some(handle_show(state, req)),
        _ => None,
    }
}
