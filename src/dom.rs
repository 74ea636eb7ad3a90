use std::fmt::Debug;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyState {
    #[serde(rename = "loading")]
    Loading,

    #[serde(rename = "interactive")]
    Interactive,

    #[serde(rename = "complete")]
    Complete,
}

impl ReadyState {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Interactive | Self::Complete)
    }
}

/// A live page that can be queried structurally and poked with simulated input.
///
/// Node handles are only meaningful until the next [`Document::refresh`]; callers must
/// re-query instead of keeping them around.
pub trait Document {
    type Node: Copy + Eq + Debug;

    fn ready_state(&self) -> ReadyState;

    /// Brings the document up to date with the page. Called once at the start of every
    /// poll cycle.
    fn refresh(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// First node in document order matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// First descendant of `node` matching `selector`.
    fn query_in(&self, node: Self::Node, selector: &str) -> Option<Self::Node>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn text(&self, node: Self::Node) -> String;

    /// Whether neither the node nor any of its ancestors is hidden.
    fn is_visible(&self, node: Self::Node) -> bool;

    fn style(&self, node: Self::Node, property: &str) -> Option<String>;

    fn set_style(&mut self, node: Self::Node, property: &str, value: Option<&str>);

    /// Synthesizes a click at a position relative to the node's bounding box, with
    /// `(0.0, 0.0)` being the top left corner.
    fn click_at(&mut self, node: Self::Node, x: f64, y: f64);

    fn click(&mut self, node: Self::Node) {
        self.click_at(node, 0.5, 0.5);
    }

    fn is_disabled(&self, node: Self::Node) -> bool {
        self.attribute(node, "disabled").is_some()
    }

    /// Trimmed text of the first node matching `selector`; empty text counts as absent.
    fn query_text(&self, selector: &str) -> Option<String> {
        let node = self.query(selector)?;
        non_empty(self.text(node))
    }

    fn query_attribute(&self, selector: &str, name: &str) -> Option<String> {
        let node = self.query(selector)?;
        self.attribute(node, name)
    }
}

pub fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
