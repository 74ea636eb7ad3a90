use serde::Serialize;

use crate::elements::ElementSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackStatus {
    #[serde(rename = "playing")]
    Playing,

    #[serde(rename = "paused")]
    Paused,

    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub art_location: Option<String>,
    pub rating: Option<f64>,
    pub length: Option<String>,
}

impl TrackMetadata {
    /// Metadata published while an advertisement hides the real track.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportState {
    pub status: PlaybackStatus,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub can_play: bool,
    pub can_pause: bool,
    pub can_seek: bool,
    pub can_change_volume: bool,
    pub can_rate: bool,
}

impl<N> From<&ElementSet<N>> for TransportState {
    fn from(elements: &ElementSet<N>) -> Self {
        let status = if elements.pause.is_some() {
            PlaybackStatus::Playing
        } else if elements.play.is_some() {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Unknown
        };
        Self {
            status,
            can_go_prev: elements.prev.is_some(),
            can_go_next: elements.next.is_some(),
            can_play: elements.play.is_some(),
            can_pause: elements.pause.is_some(),
            can_seek: status != PlaybackStatus::Unknown && elements.progress_bar.is_some(),
            can_change_volume: elements.volume_bar.is_some() || elements.expanding_menu.is_some(),
            can_rate: elements.like.is_some() || elements.dislike.is_some(),
        }
    }
}
