//! Snapshot Filtering
//!
//! Narrows a snapshot by title search and channel before analytics run on it.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::{Deserialize, Serialize};

use super::channels::{channel_aggregates, channel_label};
use crate::core::videos::VideoEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFilter {
    /// Fuzzy title query, case-insensitive
    pub title_query: String,
    /// Exact channel label; `Unknown Channel` selects entries with no channel
    pub channel: Option<String>,
}

impl VideoFilter {
    pub fn is_empty(&self) -> bool {
        self.title_query.trim().is_empty() && self.channel.as_deref().is_none_or(str::is_empty)
    }

    pub fn matches(&self, video: &VideoEntry) -> bool {
        TitleMatcher::new(&self.title_query).matches(&video.title) && self.matches_channel(video)
    }

    fn matches_channel(&self, video: &VideoEntry) -> bool {
        match self.channel.as_deref() {
            Some(channel) if !channel.is_empty() => channel_label(&video.channel) == channel,
            _ => true,
        }
    }

    /// Matching entries, in input order.
    pub fn apply(&self, videos: &[VideoEntry]) -> Vec<VideoEntry> {
        if self.is_empty() {
            return videos.to_vec();
        }

        let mut titles = TitleMatcher::new(&self.title_query);
        videos
            .iter()
            .filter(|v| titles.matches(&v.title) && self.matches_channel(v))
            .cloned()
            .collect()
    }
}

/// Fuzzy title matching. A blank query matches every title.
struct TitleMatcher {
    pattern: Option<Pattern>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl TitleMatcher {
    fn new(query: &str) -> Self {
        let query = query.trim();
        let pattern = (!query.is_empty())
            .then(|| Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart));

        Self {
            pattern,
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    fn matches(&mut self, title: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        pattern
            .score(Utf32Str::new(title, &mut self.buf), &mut self.matcher)
            .is_some()
    }
}

/// Channel labels for a picker, most logged first.
pub fn available_channels(videos: &[VideoEntry]) -> Vec<String> {
    channel_aggregates(videos)
        .into_iter()
        .map(|agg| agg.channel)
        .collect()
}
