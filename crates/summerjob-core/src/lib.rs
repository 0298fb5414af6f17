pub mod area;
pub mod event;
pub mod log_event;
pub mod messages;
pub mod photo;
pub mod proposed_job;
pub mod serde_util;
pub mod tool;
pub mod validate;
pub mod worker;

pub use area::Area;
pub use event::SummerJobEvent;
pub use log_event::ApiLogEvent;
pub use photo::{NewPhoto, Photo};
pub use proposed_job::{Allergy, JobType, ProposedJob};
pub use tool::{Tool, ToolChanges, ToolGroup, ToolInput, ToolName};
pub use validate::{Field, Schema, ValidationErrors};
pub use worker::Worker;
