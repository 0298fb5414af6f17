pub mod areas;
pub mod events;
pub mod photos;
pub mod proposed_jobs;
pub mod tools;
pub mod workers;
