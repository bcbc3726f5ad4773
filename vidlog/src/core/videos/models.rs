//! Video Models
//!
//! The persisted watch-log entry, the draft used to create one, and the
//! collection ordering.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{is_valid_rating, parse_log_date, CoreError, CoreResult, VideoId, UNRATED};

// =============================================================================
// Video Entry
// =============================================================================

/// One logged watch.
///
/// Field order here is the field order on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Opaque identifier, immutable after creation
    pub id: VideoId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    /// Free-form, normally `YYYY-MM-DD`
    #[serde(default)]
    pub release_date: String,
    /// When the user watched it (`2025-01-01 1:00 PM`)
    #[serde(default)]
    pub log_date: String,
    /// 0 = unrated, otherwise 0.5..=5.0 in half steps
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rewatched: bool,
    #[serde(default)]
    pub review: String,
    /// Set once by the repository, never changed afterwards
    pub created_at: DateTime<Utc>,
}

impl VideoEntry {
    pub(crate) fn from_draft(id: VideoId, draft: VideoDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            url: draft.url,
            title: draft.title,
            channel: draft.channel,
            release_date: draft.release_date,
            log_date: draft.log_date,
            rating: draft.rating,
            rewatched: draft.rewatched,
            review: draft.review,
            created_at,
        }
    }

    pub fn is_rated(&self) -> bool {
        self.rating > UNRATED
    }

    /// Parsed `log_date`, if well-formed.
    pub fn logged_at(&self) -> Option<NaiveDateTime> {
        parse_log_date(&self.log_date)
    }

    /// Checks the user-editable fields.
    pub fn validate(&self) -> CoreResult<()> {
        validate_fields(self.rating, &self.log_date)
    }
}

// =============================================================================
// Video Draft
// =============================================================================

/// User input for a new entry. The repository assigns `id` and `created_at`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDraft {
    pub url: String,
    pub title: String,
    pub channel: String,
    pub release_date: String,
    pub log_date: String,
    pub rating: f64,
    pub rewatched: bool,
    pub review: String,
}

impl VideoDraft {
    pub fn validate(&self) -> CoreResult<()> {
        validate_fields(self.rating, &self.log_date)
    }
}

fn validate_fields(rating: f64, log_date: &str) -> CoreResult<()> {
    if !is_valid_rating(rating) {
        return Err(CoreError::ValidationError(format!(
            "rating must be 0 or a half step between 0.5 and 5, got {rating}"
        )));
    }
    if parse_log_date(log_date).is_none() {
        return Err(CoreError::ValidationError(format!(
            "log date '{log_date}' is not in the form YYYY-MM-DD h:MM AM/PM"
        )));
    }
    Ok(())
}

// =============================================================================
// Ordering
// =============================================================================

/// Newest `log_date` first. When either side's `log_date` does not parse, that
/// pair is ordered by `created_at`, newest first.
pub fn compare_by_log_date(a: &VideoEntry, b: &VideoEntry) -> Ordering {
    compare_keyed(
        (a.logged_at().as_ref(), a),
        (b.logged_at().as_ref(), b),
    )
}

fn compare_keyed(
    (a_key, a): (Option<&NaiveDateTime>, &VideoEntry),
    (b_key, b): (Option<&NaiveDateTime>, &VideoEntry),
) -> Ordering {
    match (a_key, b_key) {
        (Some(a_at), Some(b_at)) => b_at.cmp(a_at),
        _ => b.created_at.cmp(&a.created_at),
    }
}

/// Sorts in place with [`compare_by_log_date`].
///
/// The per-pair fallback is not a total order once valid and invalid dates are
/// mixed, so this uses a stable insertion sort that terminates deterministically
/// on any input instead of `slice::sort_by`.
pub fn sort_by_log_date(videos: &mut Vec<VideoEntry>) {
    let mut keyed: Vec<(Option<NaiveDateTime>, VideoEntry)> = videos
        .drain(..)
        .map(|v| (v.logged_at(), v))
        .collect();

    for i in 1..keyed.len() {
        let mut j = i;
        while j > 0 {
            let (prev_key, prev) = &keyed[j - 1];
            let (cur_key, cur) = &keyed[j];
            if compare_keyed((prev_key.as_ref(), prev), (cur_key.as_ref(), cur))
                != Ordering::Greater
            {
                break;
            }
            keyed.swap(j - 1, j);
            j -= 1;
        }
    }

    videos.extend(keyed.into_iter().map(|(_, v)| v));
}
