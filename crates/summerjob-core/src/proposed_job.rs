use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messages;
use crate::serde_util::double_option;
use crate::tool::{Tool, ToolChanges};
use crate::validate::{int_field, Field, Schema, ValidationErrors, FORM_KEY};

/// Most photos a single proposed job may hold.
pub const MAX_PHOTOS: usize = 10;
/// Multipart field carrying proposed-job photos.
pub const PHOTO_FIELD: &str = "photoFiles";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Wood,
    Garden,
    Housework,
    Painting,
    Other,
}

impl JobType {
    pub const ALL: &[JobType] = &[
        JobType::Wood,
        JobType::Garden,
        JobType::Housework,
        JobType::Painting,
        JobType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Wood => "WOOD",
            JobType::Garden => "GARDEN",
            JobType::Housework => "HOUSEWORK",
            JobType::Painting => "PAINTING",
            JobType::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JobType::Wood => "Wood",
            JobType::Garden => "Garden",
            JobType::Housework => "Housework",
            JobType::Painting => "Painting",
            JobType::Other => "Other",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "WOOD" => Some(JobType::Wood),
            "GARDEN" => Some(JobType::Garden),
            "HOUSEWORK" => Some(JobType::Housework),
            "PAINTING" => Some(JobType::Painting),
            "OTHER" => Some(JobType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Allergy {
    Dust,
    Animals,
    Hay,
    Pollen,
    Mites,
}

impl Allergy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Allergy::Dust => "DUST",
            Allergy::Animals => "ANIMALS",
            Allergy::Hay => "HAY",
            Allergy::Pollen => "POLLEN",
            Allergy::Mites => "MITES",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "DUST" => Some(Allergy::Dust),
            "ANIMALS" => Some(Allergy::Animals),
            "HAY" => Some(Allergy::Hay),
            "POLLEN" => Some(Allergy::Pollen),
            "MITES" => Some(Allergy::Mites),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedJob {
    pub id: String,
    pub name: String,
    pub public_description: String,
    pub private_description: String,
    pub allergens: Vec<Allergy>,
    pub address: String,
    pub coordinates: Option<[f64; 2]>,
    pub contact: String,
    pub required_days: i32,
    pub min_workers: i32,
    pub max_workers: i32,
    pub strong_workers: i32,
    pub priority: i32,
    pub has_food: bool,
    pub has_shower: bool,
    pub pinned: bool,
    pub hidden: bool,
    pub completed: bool,
    pub availability: Vec<NaiveDate>,
    pub job_type: JobType,
    pub area_id: Option<String>,
    pub photo_ids: Vec<String>,
    #[serde(default)]
    pub tools_on_site: Vec<Tool>,
    #[serde(default)]
    pub tools_to_take_with: Vec<Tool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProposedJob {
    /// Cross-field worker-count rules on a complete record.
    pub fn worker_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.max_workers < self.min_workers {
            errors.add("maxWorkers", messages::MAX_BELOW_MIN_WORKERS);
        }
        if self.strong_workers > self.max_workers {
            errors.add("strongWorkers", messages::STRONG_ABOVE_MAX_WORKERS);
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposedJob {
    pub name: String,
    #[serde(default)]
    pub public_description: String,
    #[serde(default)]
    pub private_description: String,
    #[serde(default)]
    pub allergens: Vec<Allergy>,
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
    pub contact: String,
    pub required_days: i32,
    pub min_workers: i32,
    pub max_workers: i32,
    #[serde(default)]
    pub strong_workers: i32,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub has_food: bool,
    #[serde(default)]
    pub has_shower: bool,
    #[serde(default)]
    pub availability: Vec<NaiveDate>,
    pub job_type: JobType,
    #[serde(default)]
    pub area_id: Option<String>,
}

fn default_priority() -> i32 {
    1
}

/// Dirty fields of a proposed job. `None` means "not changed".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposedJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<Allergy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub coordinates: Option<Option<[f64; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_workers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strong_workers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_food: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_shower: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area_id: Option<Option<String>>,
}

impl UpdateProposedJob {
    /// Copy every dirty field onto `job`, leaving the rest untouched.
    pub fn apply_to(&self, job: &mut ProposedJob) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut job.name, &self.name);
        set(&mut job.public_description, &self.public_description);
        set(&mut job.private_description, &self.private_description);
        set(&mut job.allergens, &self.allergens);
        set(&mut job.address, &self.address);
        set(&mut job.coordinates, &self.coordinates);
        set(&mut job.contact, &self.contact);
        set(&mut job.required_days, &self.required_days);
        set(&mut job.min_workers, &self.min_workers);
        set(&mut job.max_workers, &self.max_workers);
        set(&mut job.strong_workers, &self.strong_workers);
        set(&mut job.priority, &self.priority);
        set(&mut job.has_food, &self.has_food);
        set(&mut job.has_shower, &self.has_shower);
        set(&mut job.pinned, &self.pinned);
        set(&mut job.hidden, &self.hidden);
        set(&mut job.completed, &self.completed);
        set(&mut job.availability, &self.availability);
        set(&mut job.job_type, &self.job_type);
        set(&mut job.area_id, &self.area_id);
    }

    /// True when the worker-count rules need re-checking against the stored job.
    pub fn touches_workers(&self) -> bool {
        self.min_workers.is_some() || self.max_workers.is_some() || self.strong_workers.is_some()
    }
}

fn workers_in_order(record: &Map<String, Value>) -> bool {
    match (int_field(record, "minWorkers"), int_field(record, "maxWorkers")) {
        (Some(min), Some(max)) => max >= min,
        _ => true,
    }
}

fn strong_within_max(record: &Map<String, Value>) -> bool {
    match (int_field(record, "strongWorkers"), int_field(record, "maxWorkers")) {
        (Some(strong), Some(max)) => strong <= max,
        _ => true,
    }
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::text("name").required(messages::EMPTY_PROPOSED_JOB_NAME))
        .field(Field::text("publicDescription"))
        .field(Field::text("privateDescription"))
        .field(Field::many_of("allergens", |s| Allergy::parse_str(s).is_some()))
        .field(Field::text("address").required(messages::EMPTY_ADDRESS))
        .field(Field::coordinates("coordinates").nullable())
        .field(Field::text("contact").required(messages::EMPTY_CONTACT_INFORMATION))
        .field(
            Field::integer("requiredDays")
                .required(messages::EMPTY_REQUIRED_DAYS)
                .invalid_type(messages::INVALID_TYPE_NUMBER)
                .min(1, messages::NON_POSITIVE_NUMBER),
        )
        .field(
            Field::integer("minWorkers")
                .required(messages::EMPTY_MIN_WORKERS)
                .invalid_type(messages::INVALID_TYPE_MIN_WORKERS)
                .min(1, messages::NON_POSITIVE_MIN_WORKERS),
        )
        .field(
            Field::integer("maxWorkers")
                .required(messages::EMPTY_MAX_WORKERS)
                .invalid_type(messages::INVALID_TYPE_MAX_WORKERS)
                .min(1, messages::NON_POSITIVE_MAX_WORKERS),
        )
        .field(
            Field::integer("strongWorkers")
                .invalid_type(messages::INVALID_TYPE_STRONG_WORKERS)
                .min(0, messages::NEGATIVE_STRONG_WORKERS),
        )
        .field(
            Field::integer("priority")
                .invalid_type(messages::INVALID_TYPE_NUMBER)
                .min(1, messages::NON_POSITIVE_NUMBER),
        )
        .field(Field::boolean("hasFood"))
        .field(Field::boolean("hasShower"))
        .field(Field::date_array("availability"))
        .field(
            Field::one_of("jobType", |s| JobType::parse_str(s).is_some())
                .required(messages::EMPTY_JOB_TYPE),
        )
        .field(Field::text("areaId").nullable())
        .check("maxWorkers", messages::MAX_BELOW_MIN_WORKERS, workers_in_order)
        .check(
            "strongWorkers",
            messages::STRONG_ABOVE_MAX_WORKERS,
            strong_within_max,
        )
}

pub fn update_schema() -> Schema {
    create_schema()
        .partial()
        .field(Field::boolean("pinned"))
        .field(Field::boolean("hidden"))
        .field(Field::boolean("completed"))
        .field(Field::text_array("photoIdsDeleted"))
}

fn take_object(json: &Value) -> Result<Map<String, Value>, ValidationErrors> {
    json.as_object()
        .cloned()
        .ok_or_else(|| ValidationErrors::single(FORM_KEY, messages::EXPECTED_OBJECT))
}

/// Validated payload of a proposed-job create submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedJobCreateInput {
    pub job: CreateProposedJob,
    pub tools: ToolChanges,
}

impl ProposedJobCreateInput {
    pub fn parse(json: &Value) -> Result<Self, ValidationErrors> {
        let mut object = take_object(json)?;
        let mut errors = ValidationErrors::new();
        let tools = ToolChanges::take_from(&mut object, &mut errors);
        match create_schema().parse::<CreateProposedJob>(&Value::Object(object)) {
            Ok(job) => errors.into_result(Self { job, tools }),
            Err(e) => {
                errors.merge(e);
                Err(errors)
            }
        }
    }
}

/// Validated payload of a proposed-job update submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposedJobUpdateInput {
    pub fields: UpdateProposedJob,
    pub photo_ids_deleted: Vec<String>,
    pub tools: ToolChanges,
}

impl ProposedJobUpdateInput {
    pub fn parse(json: &Value) -> Result<Self, ValidationErrors> {
        let mut object = take_object(json)?;
        let mut errors = ValidationErrors::new();
        let tools = ToolChanges::take_from(&mut object, &mut errors);
        let mut cleaned = match update_schema().validate(&Value::Object(object)) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                errors.merge(e);
                return Err(errors);
            }
        };
        let photo_ids_deleted = match cleaned.remove("photoIdsDeleted") {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ValidationErrors::single("photoIdsDeleted", e.to_string()))?,
            None => Vec::new(),
        };
        let fields = serde_json::from_value(Value::Object(cleaned))
            .map_err(|e| ValidationErrors::single(FORM_KEY, e.to_string()))?;
        errors.into_result(Self {
            fields,
            photo_ids_deleted,
            tools,
        })
    }
}
