use serde_json::json;

use crate::ipc::helpers::{get_required_i64, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::MemorizationEntry;

fn memorization_set(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if !state.store.student_exists(&student_id) {
        return Err(HandlerErr::not_found("student not found"));
    }
    let surah = get_required_str(params, "surah")?;
    if surah.trim().is_empty() {
        return Err(HandlerErr::bad_params("surah must not be empty"));
    }
    let ayahs_total = get_required_i64(params, "ayahsTotal")?;
    if ayahs_total < 1 {
        return Err(HandlerErr::bad_params("ayahsTotal must be at least 1"));
    }
    let ayahs_done = params
        .get("ayahsDone")
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
        .max(0);
    let entry = MemorizationEntry {
        surah: surah.trim().to_string(),
        ayahs_done: (ayahs_done.min(ayahs_total)) as u32,
        ayahs_total: ayahs_total as u32,
    };
    state.store.set_memorization(&student_id, entry);
    Ok(json!({ "ok": true }))
}

fn memorization_open(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let entries = state.store.memorization_for(&student_id);
    let done: u64 = entries.iter().map(|e| u64::from(e.ayahs_done)).sum();
    let total: u64 = entries.iter().map(|e| u64::from(e.ayahs_total)).sum();
    let overall_percent = if total == 0 {
        0.0
    } else {
        100.0 * done as f64 / total as f64
    };
    let completed = entries
        .iter()
        .filter(|e| e.ayahs_done == e.ayahs_total)
        .count();
    Ok(json!({
        "studentId": student_id,
        "entries": entries,
        "completedSurahs": completed,
        "overallPercent": overall_percent,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "memorization.set" => Some(respond(req, memorization_set(state, &req.params))),
        "memorization.open" => Some(respond(req, memorization_open(state, &req.params))),
        _ => None,
    }
}
