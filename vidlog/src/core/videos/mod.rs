//! Video Repository Module
//!
//! The persisted watch-log entry and CRUD over the collection.

mod models;
mod repository;

pub use models::{compare_by_log_date, sort_by_log_date, VideoDraft, VideoEntry};
pub use repository::{generate_video_id, VideoRepository};
