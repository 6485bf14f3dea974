use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn handle_health(req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

fn settings_get(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let key = get_required_str(params, "key")?;
    let value = state
        .settings
        .get(&key)
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    Ok(json!({ "key": key, "value": value }))
}

fn settings_set(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let key = get_required_str(params, "key")?;
    let value = params
        .get("value")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing value"))?;
    // The activity cap is live configuration, not just a stored value.
    if key == "activityLimit" {
        let limit = value
            .as_u64()
            .ok_or_else(|| HandlerErr::bad_params("activityLimit must be a non-negative integer"))?;
        state.store.set_activity_limit(limit as usize);
    }
    state.settings.insert(key, value);
    Ok(json!({ "ok": true }))
}

fn activity_recent(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let entries: Vec<_> = state.store.recent_activity().collect();
    Ok(json!({ "activity": entries }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(req)),
        "settings.get" => Some(respond(req, settings_get(state, &req.params))),
        "settings.set" => Some(respond(req, settings_set(state, &req.params))),
        "activity.recent" => Some(respond(req, activity_recent(state))),
        _ => None,
    }
}
