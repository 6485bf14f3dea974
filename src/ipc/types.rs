use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;

use crate::attendance::AttendanceLedger;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The one owned context for the whole process. Constructed in `main`,
/// passed `&mut` into every handler, dropped at shutdown. Nothing here
/// survives the process; persistence is the caller's concern.
pub struct AppState {
    pub store: Store,
    pub ledger: AttendanceLedger,
    pub settings: HashMap<String, serde_json::Value>,
}

impl AppState {
    pub fn new() -> Self {
        let mut settings = HashMap::new();
        settings.insert("schoolYearStartMonth".to_string(), json!(9));
        settings.insert(
            "activityLimit".to_string(),
            json!(crate::store::DEFAULT_ACTIVITY_LIMIT),
        );
        AppState {
            store: Store::new(),
            ledger: AttendanceLedger::default(),
            settings,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}
