use serde_json::json;

use crate::filter::{self, Predicate};
use crate::ipc::helpers::{
    get_opt_str, get_required_date, get_required_str, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{Assignment, AssignmentPatch};

fn check_status(status: &str) -> Result<(), HandlerErr> {
    if status == "open" || status == "closed" {
        Ok(())
    } else {
        Err(HandlerErr::bad_params("status must be open or closed"))
    }
}

fn assignments_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(params, "title").and_then(|t| {
        let trimmed = t.trim().to_string();
        if trimmed.is_empty() {
            Err(HandlerErr::bad_params("title must not be empty"))
        } else {
            Ok(trimmed)
        }
    })?;
    let due_date = get_required_date(params, "dueDate")?;
    let class_id = get_opt_str(params, "classId");
    if let Some(id) = class_id.as_deref() {
        if !state.store.class_exists(id) {
            return Err(HandlerErr::not_found("class not found"));
        }
    }
    let status = get_opt_str(params, "status").unwrap_or_else(|| "open".to_string());
    check_status(&status)?;
    let assignment = Assignment {
        id: get_opt_str(params, "id").unwrap_or_default(),
        title,
        class_id,
        due_date,
        status,
        points: params.get("points").and_then(|v| v.as_f64()),
    };
    let assignment_id = state.store.add_assignment(assignment);
    Ok(json!({ "assignmentId": assignment_id }))
}

fn assignments_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let mut predicates: Vec<Predicate<Assignment>> = Vec::new();
    if let Some(class_sel) = get_opt_str(params, "classId") {
        predicates.push(Box::new(move |a: &Assignment| {
            filter::matches_selection(&class_sel, a.class_id.as_deref().unwrap_or(""))
        }));
    }
    if let Some(status_sel) = get_opt_str(params, "status") {
        predicates.push(Box::new(move |a: &Assignment| {
            filter::matches_selection(&status_sel, &a.status)
        }));
    }
    let assignments = filter::apply_filters(state.store.assignments(), &predicates);
    Ok(json!({ "assignments": assignments }))
}

fn assignments_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assignment_id = get_required_str(params, "assignmentId")?;
    let patch_value = params.get("patch").cloned().unwrap_or_else(|| json!({}));
    let mut patch: AssignmentPatch = serde_json::from_value(patch_value)
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?;
    if let Some(status) = patch.status.as_deref() {
        check_status(status)?;
    }
    if let Some(class_id) = patch.class_id.as_deref() {
        if !state.store.class_exists(class_id) {
            return Err(HandlerErr::not_found("class not found"));
        }
    }
    if let Some(raw) = patch.due_date.take() {
        let date = crate::calendar::parse_date(raw.trim())
            .ok_or_else(|| HandlerErr::bad_params("dueDate must be YYYY-MM-DD"))?;
        patch.due_date = Some(crate::calendar::format_date(date));
    }
    if !state.store.update_assignment(&assignment_id, patch) {
        return Err(HandlerErr::not_found("assignment not found"));
    }
    Ok(json!({ "ok": true }))
}

fn assignments_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assignment_id = get_required_str(params, "assignmentId")?;
    if !state.store.remove_assignment(&assignment_id) {
        return Err(HandlerErr::not_found("assignment not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.create" => Some(respond(req, assignments_create(state, &req.params))),
        "assignments.list" => Some(respond(req, assignments_list(state, &req.params))),
        "assignments.update" => Some(respond(req, assignments_update(state, &req.params))),
        "assignments.delete" => Some(respond(req, assignments_delete(state, &req.params))),
        _ => None,
    }
}
