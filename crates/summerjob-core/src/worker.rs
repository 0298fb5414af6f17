use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages;
use crate::proposed_job::Allergy;
use crate::validate::{Field, Schema, ValidationErrors};

/// Multipart field carrying a worker's photo.
pub const PHOTO_FIELD: &str = "photoFile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub is_strong: bool,
    pub allergies: Vec<Allergy>,
    pub availability: Vec<NaiveDate>,
    /// Key of the worker's photo relative to the upload root.
    pub photo_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorker {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub is_strong: bool,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub availability: Vec<NaiveDate>,
}

fn is_name(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn is_phone(s: &str) -> bool {
    let digits = s.chars().filter(char::is_ascii_digit).count();
    let body = s.strip_prefix('+').unwrap_or(s);
    (9..=15).contains(&digits) && body.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(
            Field::text("firstName")
                .required(messages::EMPTY_FIRST_NAME)
                .matches(is_name, messages::INVALID_REGEX_NAME),
        )
        .field(
            Field::text("lastName")
                .required(messages::EMPTY_LAST_NAME)
                .matches(is_name, messages::INVALID_REGEX_NAME),
        )
        .field(
            Field::text("email")
                .required(messages::EMPTY_EMAIL)
                .matches(is_email, messages::INVALID_EMAIL),
        )
        .field(
            Field::text("phone")
                .required(messages::EMPTY_PHONE)
                .matches(is_phone, messages::INVALID_REGEX_PHONE),
        )
        .field(Field::boolean("isStrong"))
        .field(Field::many_of("allergies", |s| Allergy::parse_str(s).is_some()))
        .field(Field::date_array("availability"))
}

impl CreateWorker {
    pub fn parse(json: &Value) -> Result<Self, ValidationErrors> {
        create_schema().parse(json)
    }
}
