use chrono::Local;
use serde_json::json;

use crate::calendar::{build_grid, days_in_month, first_weekday, CalendarEvent};
use crate::ipc::helpers::{
    get_opt_str, get_required_date, get_required_i64, get_required_str, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};

fn events_create(
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
    let date = get_required_date(params, "date")?;
    let event = CalendarEvent {
        id: get_opt_str(params, "id").unwrap_or_default(),
        title,
        date,
        time: get_opt_str(params, "time"),
        kind: get_opt_str(params, "type"),
        description: get_opt_str(params, "description"),
    };
    let event_id = state.store.add_event(event);
    Ok(json!({ "eventId": event_id }))
}

fn events_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "events": state.store.events() }))
}

fn events_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_str(params, "eventId")?;
    if !state.store.remove_event(&event_id) {
        return Err(HandlerErr::not_found("event not found"));
    }
    Ok(json!({ "ok": true }))
}

fn month_params(params: &serde_json::Value) -> Result<(i32, u32), HandlerErr> {
    let year = get_required_i64(params, "year")? as i32;
    let month = get_required_i64(params, "month")?;
    if !(1..=12).contains(&month) {
        return Err(HandlerErr::bad_params("month must be between 1 and 12"));
    }
    Ok((year, month as u32))
}

fn calendar_month_grid(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let (year, month) = month_params(params)?;
    let today = Local::now().date_naive();
    let grid = build_grid(year, month, state.store.events(), today);

    let cells: Vec<serde_json::Value> = grid
        .iter()
        .map(|cell| match cell {
            None => serde_json::Value::Null,
            Some(cell) => json!({
                "day": cell.day,
                "isToday": cell.is_today,
                "events": cell.visible_events(),
                "moreCount": cell.overflow_count(),
            }),
        })
        .collect();

    Ok(json!({
        "year": year,
        "month": month,
        "daysInMonth": days_in_month(year, month),
        "firstWeekday": first_weekday(year, month),
        "cells": cells,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "events.create" => Some(respond(req, events_create(state, &req.params))),
        "events.list" => Some(respond(req, events_list(state))),
        "events.delete" => Some(respond(req, events_delete(state, &req.params))),
        "calendar.monthGrid" => Some(respond(req, calendar_month_grid(state, &req.params))),
        _ => None,
    }
}
