//! Navigation routes passed between views.
//!
//! Each route names a destination and carries the payload that destination
//! needs. Equality is spelled out per variant: two routes are equal only when
//! they target the same view with the same payload shape and values.

use serde::{Deserialize, Serialize};

use crate::core::VideoId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Menu,
    LogVideo,
    LogList,
    LogDetails,
    EditLog,
    Stats,
    Settings,
    Sync,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutePayload {
    #[default]
    None,
    /// A single entry, for details and edit views
    Video { video_id: VideoId },
    /// Cursor position to restore in the settings list
    Settings { list_index: usize },
}

impl PartialEq for RoutePayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RoutePayload::None, RoutePayload::None) => true,
            (RoutePayload::Video { video_id: a }, RoutePayload::Video { video_id: b }) => a == b,
            (
                RoutePayload::Settings { list_index: a },
                RoutePayload::Settings { list_index: b },
            ) => a == b,
            _ => false,
        }
    }
}

impl Eq for RoutePayload {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub view: View,
    #[serde(default)]
    pub payload: RoutePayload,
}

impl Route {
    pub fn to(view: View) -> Self {
        Self {
            view,
            payload: RoutePayload::None,
        }
    }

    pub fn video(view: View, video_id: impl Into<VideoId>) -> Self {
        Self {
            view,
            payload: RoutePayload::Video {
                video_id: video_id.into(),
            },
        }
    }

    pub fn settings(list_index: usize) -> Self {
        Self {
            view: View::Settings,
            payload: RoutePayload::Settings { list_index },
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match &self.payload {
            RoutePayload::Video { video_id } => Some(video_id),
            _ => None,
        }
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view && self.payload == other.payload
    }
}

impl Eq for Route {}
