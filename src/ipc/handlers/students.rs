use serde_json::json;
use tracing::info;

use crate::filter::{self, Predicate};
use crate::ipc::helpers::{display_name, get_opt_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::{Student, StudentPatch};

/// Spreadsheet rows arrive with header-style keys (`Name`, `Parent Email`);
/// the dashboard sends camelCase. Both normalize to one canonical shape here
/// and nowhere deeper.
fn field(params: &serde_json::Value, camel: &str, header: &str) -> Option<String> {
    get_opt_str(params, camel).or_else(|| get_opt_str(params, header))
}

fn student_from_params(params: &serde_json::Value) -> Result<Student, HandlerErr> {
    let name = display_name(params).or_else(|e| field(params, "name", "Name").ok_or(e))?;
    let progress = params
        .get("progress")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Ok(Student {
        id: get_opt_str(params, "id").unwrap_or_default(),
        name,
        email: field(params, "email", "Email"),
        parent_email: field(params, "parentEmail", "Parent Email"),
        class_id: get_opt_str(params, "classId"),
        status: get_opt_str(params, "status").unwrap_or_else(|| "active".to_string()),
        progress,
    })
}

fn check_class(state: &AppState, class_id: Option<&str>) -> Result<(), HandlerErr> {
    if let Some(id) = class_id {
        if !state.store.class_exists(id) {
            return Err(HandlerErr::not_found("class not found"));
        }
    }
    Ok(())
}

fn students_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student = student_from_params(params)?;
    check_class(state, student.class_id.as_deref())?;
    let student_id = state.store.add_student(student);
    info!(%student_id, "student created");
    Ok(json!({ "studentId": student_id }))
}

fn students_bulk_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let Some(rows) = params.get("students").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing students"));
    };
    let mut created: Vec<String> = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let Ok(student) = student_from_params(row) else {
            skipped += 1;
            continue;
        };
        if check_class(state, student.class_id.as_deref()).is_err() {
            skipped += 1;
            continue;
        }
        created.push(state.store.add_student(student));
    }
    info!(created = created.len(), skipped, "bulk import finished");
    Ok(json!({ "created": created, "skipped": skipped }))
}

fn students_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let mut predicates: Vec<Predicate<Student>> = Vec::new();
    if let Some(class_sel) = get_opt_str(params, "classId") {
        predicates.push(Box::new(move |s: &Student| {
            filter::matches_selection(&class_sel, s.class_id.as_deref().unwrap_or(""))
        }));
    }
    if let Some(search) = get_opt_str(params, "search") {
        predicates.push(Box::new(move |s: &Student| {
            filter::contains_ci(&s.name, &search)
                || s.email
                    .as_deref()
                    .map(|e| filter::contains_ci(e, &search))
                    .unwrap_or(false)
        }));
    }
    if let Some(status_sel) = get_opt_str(params, "status") {
        predicates.push(Box::new(move |s: &Student| {
            filter::matches_selection(&status_sel, &s.status)
        }));
    }
    let students = filter::apply_filters(state.store.students(), &predicates);
    Ok(json!({ "students": students }))
}

fn students_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let patch_value = params.get("patch").cloned().unwrap_or_else(|| json!({}));
    let patch: StudentPatch = serde_json::from_value(patch_value)
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?;
    check_class(state, patch.class_id.as_deref())?;
    if !state.store.update_student(&student_id, patch) {
        return Err(HandlerErr::not_found("student not found"));
    }
    Ok(json!({ "ok": true }))
}

fn students_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if !state.store.remove_student(&student_id) {
        return Err(HandlerErr::not_found("student not found"));
    }
    Ok(json!({ "ok": true }))
}

fn students_stats(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!(state.store.stats()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.create" => Some(respond(req, students_create(state, &req.params))),
        "students.bulkCreate" => Some(respond(req, students_bulk_create(state, &req.params))),
        "students.list" => Some(respond(req, students_list(state, &req.params))),
        "students.update" => Some(respond(req, students_update(state, &req.params))),
        "students.delete" => Some(respond(req, students_delete(state, &req.params))),
        "students.stats" => Some(respond(req, students_stats(state))),
        _ => None,
    }
}
