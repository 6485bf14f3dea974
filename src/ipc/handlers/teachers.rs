use serde_json::json;
use tracing::info;

use crate::filter::{self, Predicate};
use crate::ipc::helpers::{display_name, get_opt_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::{Teacher, TeacherPatch};

fn teachers_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = display_name(params)?;
    let teacher = Teacher {
        id: get_opt_str(params, "id").unwrap_or_default(),
        name,
        email: get_opt_str(params, "email"),
        subject: get_opt_str(params, "subject"),
        phone: get_opt_str(params, "phone"),
        status: get_opt_str(params, "status").unwrap_or_else(|| "active".to_string()),
    };
    let teacher_id = state.store.add_teacher(teacher);
    info!(%teacher_id, "teacher created");
    Ok(json!({ "teacherId": teacher_id }))
}

fn teachers_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let mut predicates: Vec<Predicate<Teacher>> = Vec::new();
    if let Some(search) = get_opt_str(params, "search") {
        predicates.push(Box::new(move |t: &Teacher| {
            filter::contains_ci(&t.name, &search)
                || t.subject
                    .as_deref()
                    .map(|s| filter::contains_ci(s, &search))
                    .unwrap_or(false)
        }));
    }
    if let Some(status) = get_opt_str(params, "status") {
        predicates.push(Box::new(move |t: &Teacher| {
            filter::matches_selection(&status, &t.status)
        }));
    }
    let teachers = filter::apply_filters(state.store.teachers(), &predicates);
    Ok(json!({ "teachers": teachers }))
}

fn teachers_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    let patch_value = params.get("patch").cloned().unwrap_or_else(|| json!({}));
    let patch: TeacherPatch = serde_json::from_value(patch_value)
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?;
    if !state.store.update_teacher(&teacher_id, patch) {
        return Err(HandlerErr::not_found("teacher not found"));
    }
    Ok(json!({ "ok": true }))
}

fn teachers_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    if !state.store.remove_teacher(&teacher_id) {
        return Err(HandlerErr::not_found("teacher not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.create" => Some(respond(req, teachers_create(state, &req.params))),
        "teachers.list" => Some(respond(req, teachers_list(state, &req.params))),
        "teachers.update" => Some(respond(req, teachers_update(state, &req.params))),
        "teachers.delete" => Some(respond(req, teachers_delete(state, &req.params))),
        _ => None,
    }
}
