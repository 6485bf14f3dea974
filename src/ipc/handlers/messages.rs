use chrono::Utc;
use serde_json::json;

use crate::ipc::helpers::{get_opt_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Message;

fn messages_send(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let from = get_required_str(params, "from")?;
    let to = get_required_str(params, "to")?;
    let body = get_required_str(params, "body")?;
    if body.trim().is_empty() {
        return Err(HandlerErr::bad_params("body must not be empty"));
    }
    let message = Message {
        id: get_opt_str(params, "id").unwrap_or_default(),
        from,
        to,
        subject: get_opt_str(params, "subject"),
        body,
        sent_at: Utc::now().timestamp_millis(),
    };
    let message_id = state.store.add_message(message);
    Ok(json!({ "messageId": message_id }))
}

fn messages_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let participant = get_opt_str(params, "participant");
    // Newest first; the store appends in send order.
    let messages: Vec<&Message> = state
        .store
        .messages()
        .iter()
        .rev()
        .filter(|m| match participant.as_deref() {
            Some(p) => m.from == p || m.to == p,
            None => true,
        })
        .collect();
    Ok(json!({ "messages": messages }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "messages.send" => Some(respond(req, messages_send(state, &req.params))),
        "messages.list" => Some(respond(req, messages_list(state, &req.params))),
        _ => None,
    }
}
