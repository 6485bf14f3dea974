use serde_json::json;
use tracing::info;

use crate::ipc::helpers::{get_opt_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::{Class, ClassPatch};

fn classes_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name").and_then(|n| {
        let trimmed = n.trim().to_string();
        if trimmed.is_empty() {
            Err(HandlerErr::bad_params("name must not be empty"))
        } else {
            Ok(trimmed)
        }
    })?;
    let teacher_id = get_opt_str(params, "teacherId");
    if let Some(id) = teacher_id.as_deref() {
        if !state.store.teacher_exists(id) {
            return Err(HandlerErr::not_found("teacher not found"));
        }
    }
    let class = Class {
        id: get_opt_str(params, "id").unwrap_or_default(),
        name,
        subject: get_opt_str(params, "subject"),
        teacher_id,
        room: get_opt_str(params, "room"),
        schedule: get_opt_str(params, "schedule"),
    };
    let class_id = state.store.add_class(class);
    info!(%class_id, "class created");
    Ok(json!({ "classId": class_id }))
}

fn classes_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    // Include roster counts so the UI can show a useful dashboard.
    let classes: Vec<serde_json::Value> = state
        .store
        .classes()
        .iter()
        .map(|c| {
            let mut row = serde_json::to_value(c).unwrap_or_else(|_| json!({}));
            row["studentCount"] = json!(state.store.student_count_for_class(&c.id));
            row
        })
        .collect();
    Ok(json!({ "classes": classes }))
}

fn classes_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let patch_value = params.get("patch").cloned().unwrap_or_else(|| json!({}));
    let patch: ClassPatch = serde_json::from_value(patch_value)
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?;
    if let Some(teacher_id) = patch.teacher_id.as_deref() {
        if !state.store.teacher_exists(teacher_id) {
            return Err(HandlerErr::not_found("teacher not found"));
        }
    }
    if !state.store.update_class(&class_id, patch) {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(json!({ "ok": true }))
}

fn classes_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    if !state.store.remove_class(&class_id) {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.create" => Some(respond(req, classes_create(state, &req.params))),
        "classes.list" => Some(respond(req, classes_list(state))),
        "classes.update" => Some(respond(req, classes_update(state, &req.params))),
        "classes.delete" => Some(respond(req, classes_delete(state, &req.params))),
        _ => None,
    }
}
