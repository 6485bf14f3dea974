use serde_json::json;
use tracing::info;

use crate::attendance::{AttendanceRecord, AttendanceStatus};
use crate::ipc::helpers::{
    get_opt_str, get_required_date, get_required_str, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};

fn parse_status(params: &serde_json::Value) -> Result<AttendanceStatus, HandlerErr> {
    let raw = get_required_str(params, "status")?;
    AttendanceStatus::parse(&raw).ok_or_else(|| {
        HandlerErr::bad_params("status must be present|absent|late|excused|unmarked")
    })
}

fn attendance_mark(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let status = parse_status(params)?;
    let note = get_opt_str(params, "note").unwrap_or_default();
    state
        .ledger
        .mark(&date, &class_id, &student_id, AttendanceRecord { status, note });
    Ok(json!({ "ok": true }))
}

fn attendance_bulk_mark(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let status = parse_status(params)?;
    let note = get_opt_str(params, "note").unwrap_or_default();
    let Some(student_ids) = params.get("studentIds").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing studentIds"));
    };
    let mut marked = 0usize;
    for student_id in student_ids.iter().filter_map(|v| v.as_str()) {
        state.ledger.mark(
            &date,
            &class_id,
            student_id,
            AttendanceRecord {
                status,
                note: note.clone(),
            },
        );
        marked += 1;
    }
    info!(%date, %class_id, marked, "bulk attendance stamp");
    Ok(json!({ "marked": marked }))
}

const ALL_STATUSES: [AttendanceStatus; 5] = [
    AttendanceStatus::Present,
    AttendanceStatus::Absent,
    AttendanceStatus::Late,
    AttendanceStatus::Excused,
    AttendanceStatus::Unmarked,
];

fn attendance_day_open(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;

    let mut rows: Vec<_> = state.ledger.day(&date, &class_id).collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    let rows_json: Vec<serde_json::Value> = rows
        .iter()
        .map(|(student_id, record)| {
            json!({
                "studentId": student_id,
                "status": record.status,
                "note": record.note,
            })
        })
        .collect();

    let mut counts = serde_json::Map::new();
    for status in ALL_STATUSES {
        counts.insert(
            status.as_str().to_string(),
            json!(state.ledger.count_by_status(&date, &class_id, status)),
        );
    }

    Ok(json!({
        "date": date,
        "classId": class_id,
        "rows": rows_json,
        "counts": counts,
    }))
}

fn attendance_status_count(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let status = parse_status(params)?;
    Ok(json!({
        "count": state.ledger.count_by_status(&date, &class_id, status)
    }))
}

fn attendance_history(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let class_id = get_required_str(params, "classId")?;
    let history = state.ledger.history_for(&student_id, &class_id);
    Ok(json!(history))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(respond(req, attendance_mark(state, &req.params))),
        "attendance.bulkMark" => Some(respond(req, attendance_bulk_mark(state, &req.params))),
        "attendance.dayOpen" => Some(respond(req, attendance_day_open(state, &req.params))),
        "attendance.statusCount" => {
            Some(respond(req, attendance_status_count(state, &req.params)))
        }
        "attendance.history" => Some(respond(req, attendance_history(state, &req.params))),
        _ => None,
    }
}
