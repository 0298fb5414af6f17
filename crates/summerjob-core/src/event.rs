use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messages;
use crate::validate::{Field, Schema, ValidationErrors};

/// One yearly run of the camp. At most one event is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummerJobEvent {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn ends_after_start(record: &Map<String, Value>) -> bool {
    // Dates are normalised to YYYY-MM-DD, so string order is date order.
    match (
        record.get("startDate").and_then(Value::as_str),
        record.get("endDate").and_then(Value::as_str),
    ) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::text("name").required(messages::EMPTY_EVENT_NAME))
        .field(Field::date("startDate").required(messages::EMPTY_DATE))
        .field(Field::date("endDate").required(messages::EMPTY_DATE))
        .check("endDate", messages::END_BEFORE_START, ends_after_start)
}

impl CreateEvent {
    pub fn parse(json: &Value) -> Result<Self, ValidationErrors> {
        create_schema().parse(json)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_event() {
        let event = CreateEvent::parse(&json!({
            "name": "SummerJob 2026",
            "startDate": "2026-07-01",
            "endDate": "2026-07-07T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(event.end_date, NaiveDate::from_ymd_opt(2026, 7, 7).unwrap());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = CreateEvent::parse(&json!({
            "name": "SummerJob 2026",
            "startDate": "2026-07-07",
            "endDate": "2026-07-01",
        }))
        .unwrap_err();
        assert_eq!(
            err.get("endDate").unwrap(),
            &[messages::END_BEFORE_START.to_string()]
        );
    }
}
