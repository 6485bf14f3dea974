use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::types::Request;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "not_found",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(value) => ok(&req.id, value),
        Err(error) => error.response(&req.id),
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Trimmed string param; absent, non-string, and empty all read as `None`.
pub fn get_opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Required date param, returned reformatted through the canonical
/// parse/format pair so every ledger and event key has one spelling.
pub fn get_required_date(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let raw = get_required_str(params, key)?;
    let date = calendar::parse_date(raw.trim())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))?;
    Ok(calendar::format_date(date))
}

/// Entity name normalization: accepts a prebuilt `name` or the
/// `firstName`/`lastName` pair and canonicalizes to one display name.
pub fn display_name(params: &serde_json::Value) -> Result<String, HandlerErr> {
    if let Some(name) = get_opt_str(params, "name") {
        return Ok(name);
    }
    match (
        get_opt_str(params, "firstName"),
        get_opt_str(params, "lastName"),
    ) {
        (Some(first), Some(last)) => Ok(format!("{} {}", first, last)),
        _ => Err(HandlerErr::bad_params(
            "missing name (or firstName/lastName)",
        )),
    }
}
