//! Analytics Engine
//!
//! Pure computations over an in-memory snapshot of the collection. Every metric
//! is recomputed from the slice it is given, which may be the full collection or
//! a filtered subset. Nothing here touches disk.

pub mod channels;
pub mod filter;
pub mod monthly;
pub mod ratings;
pub mod streaks;
pub mod summary;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::videos::VideoEntry;

// Re-export main types
pub use channels::{channel_aggregates, channel_label, ChannelAggregate, UNKNOWN_CHANNEL};
pub use filter::{available_channels, VideoFilter};
pub use monthly::{monthly_series, MonthCount, MONTHLY_WINDOW};
pub use ratings::{rating_distribution, RatingBucket, RatingDistribution};
pub use streaks::{day_groups, streaks, DayGroup, Streak, Streaks};
pub use summary::{summarize, Summary};

/// Every metric for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub ratings: RatingDistribution,
    pub channels: Vec<ChannelAggregate>,
    pub monthly: Vec<MonthCount>,
    pub streaks: Streaks,
}

impl AnalyticsReport {
    pub fn compute(videos: &[VideoEntry], today: NaiveDate) -> Self {
        Self {
            summary: summarize(videos),
            ratings: rating_distribution(videos),
            channels: channel_aggregates(videos),
            monthly: monthly_series(videos, today),
            streaks: streaks(videos, today),
        }
    }
}
