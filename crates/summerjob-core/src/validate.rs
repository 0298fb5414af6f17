//! Declarative validation of loosely-typed JSON payloads.
//!
//! A [`Schema`] lists the fields a payload may carry, how each one is coerced
//! (form submissions deliver numbers and flags as strings) and which
//! cross-field rules apply. Validation yields either a cleaned JSON object,
//! ready for `serde_json::from_value`, or a [`ValidationErrors`] map keyed by
//! field name. Keys not named by the schema are dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::messages;

/// Key used for errors that concern the payload as a whole.
pub const FORM_KEY: &str = "form";

/// Field name → list of human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Merge `other` into `self`, nesting its keys under `prefix`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, messages) in other.0 {
            let key = if field == FORM_KEY {
                prefix.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            self.0.entry(key).or_default().extend(messages);
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn summarize(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, msgs)| format!("{field}: {}", msgs.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone)]
enum Kind {
    Text {
        pattern: Option<(fn(&str) -> bool, &'static str)>,
    },
    Integer {
        min: Option<(i64, &'static str)>,
    },
    Number,
    Boolean,
    OneOf(fn(&str) -> bool),
    ManyOf(fn(&str) -> bool),
    TextArray,
    Date,
    DateArray,
    Coordinates,
    Objects(Schema),
}

/// One entry of a [`Schema`].
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    kind: Kind,
    message: Option<&'static str>,
    optional: bool,
    nullable: bool,
    type_message: &'static str,
}

impl Field {
    fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            message: None,
            optional: true,
            nullable: false,
            type_message: messages::INVALID_TYPE,
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, Kind::Text { pattern: None })
    }

    /// Integer, also accepted as a numeric string.
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, Kind::Integer { min: None })
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, Kind::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, Kind::Boolean)
    }

    /// A single string that must satisfy `valid`, typically an enum's `parse_str`.
    pub fn one_of(name: &'static str, valid: fn(&str) -> bool) -> Self {
        Self::new(name, Kind::OneOf(valid))
    }

    pub fn many_of(name: &'static str, valid: fn(&str) -> bool) -> Self {
        Self::new(name, Kind::ManyOf(valid))
    }

    pub fn text_array(name: &'static str) -> Self {
        Self::new(name, Kind::TextArray)
    }

    /// `YYYY-MM-DD` or an RFC 3339 timestamp, normalised to `YYYY-MM-DD`.
    pub fn date(name: &'static str) -> Self {
        Self::new(name, Kind::Date)
    }

    pub fn date_array(name: &'static str) -> Self {
        Self::new(name, Kind::DateArray)
    }

    /// `[latitude, longitude]`.
    pub fn coordinates(name: &'static str) -> Self {
        Self::new(name, Kind::Coordinates)
    }

    /// Array of objects, each validated against `schema`.
    pub fn objects(name: &'static str, schema: Schema) -> Self {
        Self::new(name, Kind::Objects(schema))
    }

    /// Field must be present; `message` is reported when it is missing or
    /// (for text) blank.
    pub fn required(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self.optional = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn invalid_type(mut self, message: &'static str) -> Self {
        self.type_message = message;
        self
    }

    pub fn min(mut self, min: i64, message: &'static str) -> Self {
        if let Kind::Integer { min: ref mut bound } = self.kind {
            *bound = Some((min, message));
        }
        self
    }

    pub fn matches(mut self, check: fn(&str) -> bool, message: &'static str) -> Self {
        if let Kind::Text { ref mut pattern } = self.kind {
            *pattern = Some((check, message));
        }
        self
    }

    fn coerce(&self, value: &Value, key: &str, errors: &mut ValidationErrors) -> Option<Value> {
        let coerced = match &self.kind {
            Kind::Text { pattern } => match value.as_str() {
                Some(s) if s.trim().is_empty() => {
                    if let Some(message) = self.message {
                        errors.add(key, message);
                        return None;
                    }
                    Some(Value::String(s.to_string()))
                }
                Some(s) => {
                    if let Some((check, message)) = pattern {
                        if !check(s) {
                            errors.add(key, *message);
                            return None;
                        }
                    }
                    Some(Value::String(s.to_string()))
                }
                None => None,
            },
            Kind::Integer { min } => match as_integer(value) {
                // Stored columns are 32-bit.
                Some(n) if i32::try_from(n).is_err() => {
                    errors.add(key, messages::OUT_OF_RANGE_NUMBER);
                    return None;
                }
                Some(n) => {
                    if let Some((bound, message)) = min {
                        if n < *bound {
                            errors.add(key, *message);
                            return None;
                        }
                    }
                    Some(Value::from(n))
                }
                None => None,
            },
            Kind::Number => as_number(value).and_then(Number::from_f64).map(Value::Number),
            Kind::Boolean => as_bool(value).map(Value::Bool),
            Kind::OneOf(valid) => value
                .as_str()
                .filter(|s| valid(s))
                .map(|s| Value::String(s.to_string())),
            Kind::ManyOf(valid) => collect_each(value, |item| {
                item.as_str()
                    .filter(|s| valid(s))
                    .map(|s| Value::String(s.to_string()))
            }),
            Kind::TextArray => collect_each(value, |item| {
                item.as_str().map(|s| Value::String(s.to_string()))
            }),
            Kind::Date => as_date(value).map(date_value),
            Kind::DateArray => collect_each(value, |item| as_date(item).map(date_value)),
            Kind::Coordinates => match value.as_array().map(Vec::as_slice) {
                Some([lat, lng]) => {
                    let lat = as_number(lat).and_then(Number::from_f64);
                    let lng = as_number(lng).and_then(Number::from_f64);
                    lat.zip(lng)
                        .map(|(lat, lng)| Value::Array(vec![Value::Number(lat), Value::Number(lng)]))
                }
                _ => None,
            },
            Kind::Objects(schema) => match value.as_array() {
                Some(items) => {
                    let mut cleaned = Vec::with_capacity(items.len());
                    let mut failed = false;
                    for (i, item) in items.iter().enumerate() {
                        match schema.validate(item) {
                            Ok(map) => cleaned.push(Value::Object(map)),
                            Err(nested) => {
                                failed = true;
                                errors.extend_prefixed(&format!("{key}.{i}"), nested);
                            }
                        }
                    }
                    if failed {
                        return None;
                    }
                    Some(Value::Array(cleaned))
                }
                None => None,
            },
        };
        if coerced.is_none() && errors.get(key).is_none() {
            errors.add(key, self.type_message);
        }
        coerced
    }
}

#[derive(Clone)]
struct Check {
    field: &'static str,
    message: &'static str,
    rule: fn(&Map<String, Value>) -> bool,
}

/// An ordered set of [`Field`]s plus cross-field checks.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    checks: Vec<Check>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Cross-field rule evaluated on the coerced record. A failing rule is
    /// reported under `field`, unless that field already has an error.
    pub fn check(
        mut self,
        field: &'static str,
        message: &'static str,
        rule: fn(&Map<String, Value>) -> bool,
    ) -> Self {
        self.checks.push(Check {
            field,
            message,
            rule,
        });
        self
    }

    /// Same schema with every field optional. Present values are still
    /// checked, so a blank required text stays an error.
    pub fn partial(&self) -> Self {
        let mut schema = self.clone();
        for field in &mut schema.fields {
            field.optional = true;
        }
        schema
    }

    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>, ValidationErrors> {
        let Some(object) = input.as_object() else {
            return Err(ValidationErrors::single(FORM_KEY, messages::EXPECTED_OBJECT));
        };
        let mut errors = ValidationErrors::new();
        let mut output = Map::new();
        for field in &self.fields {
            match object.get(field.name) {
                None => {
                    if !field.optional {
                        errors.add(field.name, field.message.unwrap_or(messages::REQUIRED));
                    }
                }
                Some(Value::Null) if field.nullable => {
                    output.insert(field.name.to_string(), Value::Null);
                }
                Some(Value::Null) => {
                    errors.add(field.name, field.message.unwrap_or(field.type_message));
                }
                Some(value) => {
                    if let Some(coerced) = field.coerce(value, field.name, &mut errors) {
                        output.insert(field.name.to_string(), coerced);
                    }
                }
            }
        }
        for check in &self.checks {
            if errors.get(check.field).is_none() && !(check.rule)(&output) {
                errors.add(check.field, check.message);
            }
        }
        errors.into_result(output)
    }

    /// Validate and deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationErrors> {
        let cleaned = self.validate(input)?;
        serde_json::from_value(Value::Object(cleaned))
            .map_err(|e| ValidationErrors::single(FORM_KEY, e.to_string()))
    }
}

fn collect_each(value: &Value, item: impl Fn(&Value) -> Option<Value>) -> Option<Value> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(item)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        // A lone form value stands for a one-element list.
        Value::String(_) => item(value).map(|v| Value::Array(vec![v])),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}

fn date_value(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

/// Read an integer out of a coerced record.
pub fn int_field(record: &Map<String, Value>, name: &str) -> Option<i64> {
    record.get(name).and_then(Value::as_i64)
}
