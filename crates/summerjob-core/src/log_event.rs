use std::fmt;

/// Audit events emitted for every mutating API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiLogEvent {
    JobCreate,
    JobModify,
    JobDelete,
    ToolCreate,
    WorkerCreate,
    WorkerDelete,
    EventCreate,
    EventActivate,
    AreaCreate,
}

impl ApiLogEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiLogEvent::JobCreate => "JOB_CREATE",
            ApiLogEvent::JobModify => "JOB_MODIFY",
            ApiLogEvent::JobDelete => "JOB_DELETE",
            ApiLogEvent::ToolCreate => "TOOL_CREATE",
            ApiLogEvent::WorkerCreate => "WORKER_CREATE",
            ApiLogEvent::WorkerDelete => "WORKER_DELETE",
            ApiLogEvent::EventCreate => "EVENT_CREATE",
            ApiLogEvent::EventActivate => "EVENT_ACTIVATE",
            ApiLogEvent::AreaCreate => "AREA_CREATE",
        }
    }
}

impl fmt::Display for ApiLogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
