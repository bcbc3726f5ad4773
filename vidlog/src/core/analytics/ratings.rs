//! Rating Distribution
//!
//! Histogram over the fixed domain 1.0..=5.0 in half steps.

use serde::{Deserialize, Serialize};

use crate::core::rating_half_steps;
use crate::core::videos::VideoEntry;

/// Lowest bucket, in half steps (1.0 stars).
const FIRST_BUCKET: u8 = 2;

/// Highest bucket, in half steps (5.0 stars).
const LAST_BUCKET: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBucket {
    pub rating: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// Always nine buckets, 1.0 first
    pub buckets: Vec<RatingBucket>,
    /// Entries with `rating == 0`
    pub unrated: usize,
    /// Rated entries outside the bucket domain (0.5, or a hand-edited value
    /// that is not a half step)
    pub unbucketed: usize,
}

impl RatingDistribution {
    pub fn count_for(&self, rating: f64) -> usize {
        self.buckets
            .iter()
            .find(|b| b.rating == rating)
            .map_or(0, |b| b.count)
    }

    /// Entries that landed in a bucket.
    pub fn bucketed(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

pub fn rating_distribution(videos: &[VideoEntry]) -> RatingDistribution {
    let mut counts = [0usize; (LAST_BUCKET - FIRST_BUCKET + 1) as usize];
    let mut unrated = 0;
    let mut unbucketed = 0;

    for video in videos {
        if !video.is_rated() {
            unrated += 1;
            continue;
        }
        match rating_half_steps(video.rating) {
            Some(steps) if (FIRST_BUCKET..=LAST_BUCKET).contains(&steps) => {
                counts[(steps - FIRST_BUCKET) as usize] += 1;
            }
            _ => unbucketed += 1,
        }
    }

    let buckets = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| RatingBucket {
            rating: f64::from(FIRST_BUCKET + i as u8) / 2.0,
            count,
        })
        .collect();

    RatingDistribution {
        buckets,
        unrated,
        unbucketed,
    }
}
