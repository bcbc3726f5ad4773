//! vidlog Core
//!
//! Storage and analytics for the watch log.
//! Handles atomic persistence, the video collection, settings, and the metrics
//! computed over snapshots of the collection.

pub mod analytics;
pub mod clock;
pub mod fs;
pub mod metadata;
pub mod navigation;
pub mod settings;
pub mod store;
pub mod videos;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_durability;
