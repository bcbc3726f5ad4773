//! Video Metadata Lookup
//!
//! Collaborator used by the entry form to prefill title, creator and release
//! date from a video URL. Storage and analytics never call into it.

#[cfg(feature = "youtube")]
pub mod youtube;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::CoreResult;

#[cfg(feature = "youtube")]
pub use youtube::YouTubeClient;

/// Fields a lookup can fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    /// Channel name
    pub creator: String,
    /// `YYYY-MM-DD`, empty when the source had no usable date
    pub release_date: String,
}

/// Resolves a URL to metadata. Failures come back as
/// [`CoreError::MetadataLookupFailed`](crate::core::CoreError::MetadataLookupFailed)
/// carrying a user-facing reason.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, url: &str) -> CoreResult<VideoMetadata>;
}

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_HOST: &str = "youtu.be";
const EMBED_PREFIX: &str = "/embed/";

fn parse_youtube(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host == SHORT_HOST || YOUTUBE_HOSTS.contains(&host.as_str()) {
        Some(parsed)
    } else {
        None
    }
}

/// Whether `url` points at a single YouTube video.
pub fn is_valid_youtube_url(url: &str) -> bool {
    extract_video_id(url).is_some()
}

/// The video ID of a watch, embed or short link.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = parse_youtube(url)?;
    let path = parsed.path();

    let id = if parsed.host_str() == Some(SHORT_HOST) {
        path.trim_start_matches('/').split('/').next().map(str::to_string)
    } else if path.starts_with("/watch") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else if let Some(rest) = path.strip_prefix(EMBED_PREFIX) {
        rest.split('/').next().map(str::to_string)
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CoreError, ErrorKind};

    #[test]
    fn test_accepts_watch_embed_and_short_links() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtube.com/watch?v=abc123&t=42", "abc123"),
            ("https://m.youtube.com/watch?feature=share&v=xyz", "xyz"),
            ("https://www.youtube.com/embed/emb3d", "emb3d"),
            ("https://youtu.be/sh0rt", "sh0rt"),
            ("https://youtu.be/sh0rt?si=tracking", "sh0rt"),
            ("https://WWW.YOUTUBE.COM/watch?v=upper", "upper"),
        ];

        for (url, id) in cases {
            assert!(is_valid_youtube_url(url), "{url} should be valid");
            assert_eq!(extract_video_id(url).as_deref(), Some(id), "{url}");
        }
    }

    #[test]
    fn test_rejects_other_urls() {
        let cases = [
            "",
            "not a url",
            "youtube.com/watch?v=noscheme",
            "https://vimeo.com/12345",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/embed/",
            "https://www.youtube.com/channel/UC123",
            "https://youtu.be/",
            "https://notyoutube.com/watch?v=abc",
        ];

        for url in cases {
            assert!(!is_valid_youtube_url(url), "{url} should be rejected");
            assert_eq!(extract_video_id(url), None, "{url}");
        }
    }

    struct CannedProvider(Option<VideoMetadata>);

    #[async_trait]
    impl MetadataProvider for CannedProvider {
        async fn lookup(&self, url: &str) -> CoreResult<VideoMetadata> {
            if !is_valid_youtube_url(url) {
                return Err(CoreError::MetadataLookupFailed("invalid YouTube URL".to_string()));
            }
            self.0
                .clone()
                .ok_or_else(|| CoreError::MetadataLookupFailed("video not found".to_string()))
        }
    }

    #[tokio::test]
    async fn test_provider_trait_object() {
        let found = VideoMetadata {
            title: "Title".to_string(),
            creator: "Channel".to_string(),
            release_date: "2024-05-06".to_string(),
        };
        let provider: Box<dyn MetadataProvider> = Box::new(CannedProvider(Some(found.clone())));

        assert_eq!(provider.lookup("https://youtu.be/abc").await.unwrap(), found);

        let err = provider.lookup("https://example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);

        let empty = CannedProvider(None);
        let err = empty.lookup("https://youtu.be/abc").await.unwrap_err();
        assert!(err.to_string().contains("video not found"));
    }
}
