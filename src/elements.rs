use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::Document;

/// How the combined play/pause button announces that it currently pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseMarker {
    Attribute {
        name: &'static str,
        value: &'static str,
    },
    IconPath {
        selector: &'static str,
        prefix: &'static str,
    },
}

/// Selectors for one generation of the player bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub play: &'static str,
    pub pause_marker: PauseMarker,
    pub next: &'static str,
    pub prev: &'static str,
    pub progress_bar: &'static str,
    pub volume_bar: &'static str,
    pub volume_value: &'static str,
    pub expanding_menu: &'static str,
    pub expanded_volume_bar: &'static str,
    pub like: &'static str,
    pub dislike: &'static str,
    pub pressed_attribute: &'static str,
    pub skip_ad: &'static str,
    pub ad_marker: Option<&'static str>,
    pub title: &'static str,
    pub artist: &'static str,
    pub art: &'static str,
    pub time_info: &'static str,
}

impl Layout {
    pub const LEGACY: Layout = Layout {
        play: "#left-controls .play-pause-button",
        pause_marker: PauseMarker::Attribute {
            name: "title",
            value: "Pause",
        },
        next: "#left-controls .next-button",
        prev: "#left-controls .previous-button",
        progress_bar: "#progress-bar #sliderBar",
        volume_bar: "#volume-slider #sliderBar",
        volume_value: "#volume-slider",
        expanding_menu: "#right-controls #expanding-menu",
        expanded_volume_bar: "#expand-volume-slider #sliderBar",
        like: ".middle-controls-buttons .like",
        dislike: ".middle-controls-buttons .dislike",
        pressed_attribute: "aria-pressed",
        skip_ad: "button.videoAdUiSkipButton",
        ad_marker: None,
        title: ".middle-controls .title",
        artist: ".middle-controls .byline",
        art: ".middle-controls img",
        time_info: "#left-controls .time-info",
    };

    pub const CURRENT: Layout = Layout {
        play: "#left-controls #play-pause-button",
        pause_marker: PauseMarker::IconPath {
            selector: "path",
            prefix: "M6 19h4V5H6v14zm8-14v14h4V5h-4z",
        },
        next: "#left-controls .next-button",
        prev: "#left-controls .previous-button",
        progress_bar: "#progress-bar #sliderBar",
        volume_bar: "#right-controls #volume-slider #sliderBar",
        volume_value: "#volume-slider",
        expanding_menu: "#right-controls #expanding-menu",
        expanded_volume_bar: "#expand-volume-slider #sliderBar",
        like: "#like-button-renderer #button-shape-like button",
        dislike: "#like-button-renderer #button-shape-dislike button",
        pressed_attribute: "aria-pressed",
        skip_ad: ".ytp-ad-skip-button-modern, .ytp-ad-skip-button",
        ad_marker: Some(".ytp-ad-player-overlay, .ytp-ad-player-overlay-layout"),
        title: ".middle-controls .title",
        artist: ".middle-controls .byline",
        art: ".middle-controls img",
        time_info: "#left-controls .time-info",
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    #[serde(rename = "legacy")]
    Legacy,

    #[default]
    #[serde(rename = "current")]
    Current,
}

impl LayoutKind {
    pub fn layout(self) -> Layout {
        match self {
            LayoutKind::Legacy => Layout::LEGACY,
            LayoutKind::Current => Layout::CURRENT,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Legacy => write!(f, "legacy"),
            LayoutKind::Current => write!(f, "current"),
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "legacy" => Ok(Self::Legacy),
            "current" => Ok(Self::Current),
            other => Err(anyhow::anyhow!("Unknown layout {other:?}")),
        }
    }
}

/// Interactive nodes of the page, resolved for a single cycle or dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSet<N> {
    pub play: Option<N>,
    pub pause: Option<N>,
    pub next: Option<N>,
    pub prev: Option<N>,
    pub progress_bar: Option<N>,
    pub volume_bar: Option<N>,
    pub expanding_menu: Option<N>,
    pub like: Option<N>,
    pub dislike: Option<N>,
    pub skip_ad: Option<N>,
}

impl<N> Default for ElementSet<N> {
    fn default() -> Self {
        Self {
            play: None,
            pause: None,
            next: None,
            prev: None,
            progress_bar: None,
            volume_bar: None,
            expanding_menu: None,
            like: None,
            dislike: None,
            skip_ad: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementLocator {
    layout: Layout,
}

impl ElementLocator {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn locate<D: Document>(&self, doc: &D) -> ElementSet<D::Node> {
        let enabled = |selector: &str| doc.query(selector).filter(|&node| !doc.is_disabled(node));

        let mut elements = ElementSet {
            play: enabled(self.layout.play),
            pause: None,
            next: enabled(self.layout.next),
            prev: enabled(self.layout.prev),
            progress_bar: enabled(self.layout.progress_bar),
            volume_bar: enabled(self.layout.volume_bar),
            expanding_menu: enabled(self.layout.expanding_menu),
            like: enabled(self.layout.like),
            dislike: enabled(self.layout.dislike),
            skip_ad: enabled(self.layout.skip_ad),
        };

        if let Some(toggle) = elements.play {
            if self.shows_pause(doc, toggle) {
                elements.pause = elements.play.take();
            }
        }
        elements
    }

    /// The slider inside the expanding menu; only reachable while the menu is shown.
    pub fn expanded_volume_bar<D: Document>(&self, doc: &D) -> Option<D::Node> {
        doc.query(self.layout.expanded_volume_bar)
            .filter(|&node| !doc.is_disabled(node))
    }

    fn shows_pause<D: Document>(&self, doc: &D, toggle: D::Node) -> bool {
        match self.layout.pause_marker {
            PauseMarker::Attribute { name, value } => {
                doc.attribute(toggle, name).as_deref() == Some(value)
            }
            PauseMarker::IconPath { selector, prefix } => doc
                .query_in(toggle, selector)
                .and_then(|icon| doc.attribute(icon, "d"))
                .is_some_and(|path| path.trim_start().starts_with(prefix)),
        }
    }
}
