//! Pagination rules shared by v1 (offset) and v2 (cursor) list endpoints

use serde_json::Value;

use super::response::{ApiResponse, Params};

/// Page size assumed when neither the request nor the response names one
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// What to request after a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    Cursor(String),
    Offset(u64),
    Done,
}

impl NextPage {
    /// Decide the next page from a response and the params that produced it.
    /// A cursor wins over offset pagination.
    pub fn from_response(response: &ApiResponse, params: &Params) -> Self {
        if !response.is_success() {
            return Self::Done;
        }
        let Some(additional) = response.additional_data.as_ref().filter(|v| is_present(v)) else {
            return Self::Done;
        };

        match additional.get("next_cursor") {
            Some(Value::String(cursor)) if !cursor.is_empty() => {
                return Self::Cursor(cursor.clone());
            }
            Some(Value::Number(cursor)) => return Self::Cursor(cursor.to_string()),
            _ => {}
        }

        let pagination = additional.get("pagination");
        let more = pagination
            .and_then(|p| p.get("more_items_in_collection"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !more {
            return Self::Done;
        }

        let limit = params
            .get("limit")
            .and_then(|l| l.parse::<u64>().ok())
            .or_else(|| pagination.and_then(|p| p.get("limit")).and_then(Value::as_u64))
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let start = params
            .get("start")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        Self::Offset(start + limit)
    }

    /// Rewrite `params` for the next request; false when paging is over
    pub fn apply(&self, params: &mut Params) -> bool {
        match self {
            Self::Cursor(cursor) => {
                params.insert("cursor", cursor);
                params.remove("start");
                true
            }
            Self::Offset(start) => {
                params.insert("start", start);
                true
            }
            Self::Done => false,
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
