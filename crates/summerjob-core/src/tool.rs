use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messages;
use crate::proposed_job::JobType;
use crate::validate::{Field, Schema, ValidationErrors};

/// JSON key carrying the tools available at the job site.
pub const TOOLS_ON_SITE_KEY: &str = "toolsOnSiteCreate";
/// JSON key carrying the tools workers must bring along.
pub const TOOLS_TO_TAKE_WITH_KEY: &str = "toolsToTakeWithCreate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolName {
    Axe,
    BowSaw,
    Ladder,
    Paint,
    PaintRoller,
    CoverSheet,
    MaskingTape,
    PaintBrush,
    ScraperGrid,
    PainterSpatula,
    JapaneseSpatula,
    Gypsum,
    Bucket,
    Rag,
    Broom,
    Shovel,
    Rake,
    Other,
}

impl ToolName {
    pub const ALL: &[ToolName] = &[
        ToolName::Axe,
        ToolName::BowSaw,
        ToolName::Ladder,
        ToolName::Paint,
        ToolName::PaintRoller,
        ToolName::CoverSheet,
        ToolName::MaskingTape,
        ToolName::PaintBrush,
        ToolName::ScraperGrid,
        ToolName::PainterSpatula,
        ToolName::JapaneseSpatula,
        ToolName::Gypsum,
        ToolName::Bucket,
        ToolName::Rag,
        ToolName::Broom,
        ToolName::Shovel,
        ToolName::Rake,
        ToolName::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Axe => "AXE",
            ToolName::BowSaw => "BOW_SAW",
            ToolName::Ladder => "LADDER",
            ToolName::Paint => "PAINT",
            ToolName::PaintRoller => "PAINT_ROLLER",
            ToolName::CoverSheet => "COVER_SHEET",
            ToolName::MaskingTape => "MASKING_TAPE",
            ToolName::PaintBrush => "PAINT_BRUSH",
            ToolName::ScraperGrid => "SCRAPER_GRID",
            ToolName::PainterSpatula => "PAINTER_SPATULA",
            ToolName::JapaneseSpatula => "JAPANESE_SPATULA",
            ToolName::Gypsum => "GYPSUM",
            ToolName::Bucket => "BUCKET",
            ToolName::Rag => "RAG",
            ToolName::Broom => "BROOM",
            ToolName::Shovel => "SHOVEL",
            ToolName::Rake => "RAKE",
            ToolName::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolName::Axe => "Axe",
            ToolName::BowSaw => "Bow saw",
            ToolName::Ladder => "Ladder",
            ToolName::Paint => "Paint",
            ToolName::PaintRoller => "Paint roller",
            ToolName::CoverSheet => "Cover sheet",
            ToolName::MaskingTape => "Masking tape",
            ToolName::PaintBrush => "Paint brush",
            ToolName::ScraperGrid => "Scraper grid",
            ToolName::PainterSpatula => "Painter's spatula",
            ToolName::JapaneseSpatula => "Japanese spatula",
            ToolName::Gypsum => "Gypsum",
            ToolName::Bucket => "Bucket",
            ToolName::Rag => "Rag",
            ToolName::Broom => "Broom",
            ToolName::Shovel => "Shovel",
            ToolName::Rake => "Rake",
            ToolName::Other => "Other",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        ToolName::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Job types this tool is typically needed for.
    pub fn job_types(&self) -> &'static [JobType] {
        match self {
            ToolName::Axe | ToolName::BowSaw => &[JobType::Wood],
            ToolName::Ladder => &[JobType::Garden, JobType::Housework, JobType::Painting],
            ToolName::Paint
            | ToolName::PaintRoller
            | ToolName::CoverSheet
            | ToolName::MaskingTape
            | ToolName::PaintBrush
            | ToolName::ScraperGrid
            | ToolName::PainterSpatula
            | ToolName::JapaneseSpatula
            | ToolName::Gypsum => &[JobType::Painting],
            ToolName::Bucket | ToolName::Rag | ToolName::Broom => &[JobType::Housework],
            ToolName::Shovel | ToolName::Rake | ToolName::Other => &[JobType::Other],
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Map a raw tool identifier to job types; unknown identifiers map to `OTHER`.
pub fn job_types_for_tool(id: &str) -> &'static [JobType] {
    ToolName::parse_str(id)
        .map(|t| t.job_types())
        .unwrap_or(&[JobType::Other])
}

/// Which collection of a proposed job a tool row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGroup {
    OnSite,
    ToTakeWith,
}

impl ToolGroup {
    pub fn column(&self) -> &'static str {
        match self {
            ToolGroup::OnSite => "proposed_job_on_site_id",
            ToolGroup::ToTakeWith => "proposed_job_to_take_with_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub tool: ToolName,
    pub amount: i32,
    pub proposed_job_on_site_id: Option<String>,
    pub proposed_job_to_take_with_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool: ToolName,
    #[serde(default = "default_amount")]
    pub amount: i32,
}

fn default_amount() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
struct ToolsCreate {
    tools: Vec<ToolInput>,
}

fn tools_schema() -> Schema {
    let item = Schema::new()
        .field(
            Field::one_of("tool", |s| ToolName::parse_str(s).is_some())
                .required(messages::EMPTY_TOOL),
        )
        .field(
            Field::integer("amount")
                .invalid_type(messages::INVALID_TYPE_NUMBER)
                .min(1, messages::NON_POSITIVE_NUMBER),
        );
    Schema::new().field(Field::objects("tools", item).required(messages::REQUIRED))
}

/// Tool collections supplied with a job submission. `None` leaves the stored
/// collection untouched; `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolChanges {
    pub on_site: Option<Vec<ToolInput>>,
    pub to_take_with: Option<Vec<ToolInput>>,
}

impl ToolChanges {
    /// Remove both tool keys from `object` and validate them. Errors are
    /// collected into `errors` under the originating key.
    pub fn take_from(object: &mut Map<String, Value>, errors: &mut ValidationErrors) -> Self {
        Self {
            on_site: take_tools(object, TOOLS_ON_SITE_KEY, errors),
            to_take_with: take_tools(object, TOOLS_TO_TAKE_WITH_KEY, errors),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.on_site.is_none() && self.to_take_with.is_none()
    }
}

fn take_tools(
    object: &mut Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<Vec<ToolInput>> {
    match object.remove(key) {
        None | Some(Value::Null) => None,
        Some(value) => match tools_schema().parse::<ToolsCreate>(&value) {
            Ok(parsed) => Some(parsed.tools),
            Err(e) => {
                errors.extend_prefixed(key, e);
                None
            }
        },
    }
}
