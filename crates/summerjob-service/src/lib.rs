mod active_event;
mod local;
pub mod reconcile;
mod traits;

pub use active_event::ActiveEventCache;
pub use local::LocalService;
pub use traits::{CampService, ServiceError, StagedFile, Staging};
