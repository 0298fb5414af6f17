use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages;
use crate::validate::{Field, Schema, ValidationErrors};

/// A region of the camp that jobs are grouped into, scoped to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    pub summer_job_event_id: String,
    pub requires_car: bool,
    pub supports_adoration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArea {
    pub name: String,
    #[serde(default)]
    pub requires_car: bool,
    #[serde(default)]
    pub supports_adoration: bool,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::text("name").required(messages::EMPTY_AREA_NAME))
        .field(Field::boolean("requiresCar"))
        .field(Field::boolean("supportsAdoration"))
}

impl CreateArea {
    pub fn parse(json: &Value) -> Result<Self, ValidationErrors> {
        create_schema().parse(json)
    }
}
