//! Channel Aggregates
//!
//! Per-channel entry count and running mean rating.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::videos::VideoEntry;

/// Label used for entries without a channel.
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// Grouping key of an entry's channel.
pub fn channel_label(channel: &str) -> &str {
    if channel.is_empty() {
        UNKNOWN_CHANNEL
    } else {
        channel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAggregate {
    pub channel: String,
    /// All entries, rated or not
    pub count: usize,
    pub rated_count: usize,
    /// Meaningful only when `rated_count > 0`
    pub avg_rating: f64,
}

impl ChannelAggregate {
    fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            count: 0,
            rated_count: 0,
            avg_rating: 0.0,
        }
    }

    /// Folds one entry in. The mean is updated incrementally, in the order
    /// entries are seen, so summation order matches across runs.
    fn push(&mut self, video: &VideoEntry) {
        self.count += 1;
        if video.is_rated() {
            self.rated_count += 1;
            let n = self.rated_count as f64;
            self.avg_rating = (self.avg_rating * (n - 1.0) + video.rating) / n;
        }
    }

    pub fn average(&self) -> Option<f64> {
        (self.rated_count > 0).then_some(self.avg_rating)
    }
}

/// Aggregates in `videos` iteration order, sorted by count descending then
/// channel name ascending.
pub fn channel_aggregates(videos: &[VideoEntry]) -> Vec<ChannelAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut aggregates: Vec<ChannelAggregate> = Vec::new();

    for video in videos {
        let label = channel_label(&video.channel);
        let slot = *index.entry(label).or_insert_with(|| {
            aggregates.push(ChannelAggregate::new(label));
            aggregates.len() - 1
        });
        aggregates[slot].push(video);
    }

    aggregates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.channel.cmp(&b.channel)));
    aggregates
}
