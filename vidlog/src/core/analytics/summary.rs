//! Summary Totals

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::channels::channel_label;
use crate::core::videos::VideoEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub rated: usize,
    /// Mean over rated entries, `None` when nothing is rated
    pub average_rating: Option<f64>,
    pub rewatch_count: usize,
    /// 0..=100
    pub rewatch_percentage: f64,
    /// Entries without a channel share one label
    pub distinct_channels: usize,
}

pub fn summarize(videos: &[VideoEntry]) -> Summary {
    let mut rated = 0usize;
    let mut rating_sum = 0.0;
    let mut rewatch_count = 0usize;
    let mut channels: HashSet<&str> = HashSet::new();

    for video in videos {
        if video.is_rated() {
            rated += 1;
            rating_sum += video.rating;
        }
        if video.rewatched {
            rewatch_count += 1;
        }
        channels.insert(channel_label(&video.channel));
    }

    let total = videos.len();
    Summary {
        total,
        rated,
        average_rating: (rated > 0).then(|| rating_sum / rated as f64),
        rewatch_count,
        rewatch_percentage: if total == 0 {
            0.0
        } else {
            rewatch_count as f64 / total as f64 * 100.0
        },
        distinct_channels: channels.len(),
    }
}
