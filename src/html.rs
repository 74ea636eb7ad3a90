use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};

use crate::dom::{Document, ReadyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HtmlNode(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub node: HtmlNode,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    text: String,
    parent: Option<usize>,
}

/// Modification time and length of the page file as of the last load.
type FileStamp = (SystemTime, u64);

const CLICK_HISTORY: usize = 64;

#[derive(Debug, Clone)]
struct PageSource {
    path: PathBuf,
    stamp: Option<FileStamp>,
}

/// A parsed page snapshot. Attributes and text are frozen at parse time, inline styles
/// can be changed, and simulated clicks are recorded instead of being executed. Only the
/// most recent clicks are kept.
pub struct HtmlDocument {
    source: Option<PageSource>,
    html: Html,
    elements: Vec<ElementData>,
    ready_state: ReadyState,
    clicks: Vec<Click>,
}

impl HtmlDocument {
    pub fn parse(contents: &str) -> Self {
        let html = Html::parse_document(contents);
        let elements = index_elements(&html);
        Self {
            source: None,
            html,
            elements,
            ready_state: ReadyState::Complete,
            clicks: Vec::new(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page {}", path.display()))?;
        let mut document = Self::parse(&contents);
        document.source = Some(PageSource {
            path: path.to_path_buf(),
            stamp: file_stamp(path),
        });
        Ok(document)
    }

    pub fn describe(&self, node: HtmlNode) -> String {
        let Some(element) = self.elements.get(node.0) else {
            return format!("<detached {}>", node.0);
        };
        let mut description = element.tag.clone();
        if let Some(id) = element.attributes.get("id") {
            description.push('#');
            description.push_str(id);
        }
        if let Some(class) = element.attributes.get("class") {
            for class in class.split_whitespace() {
                description.push('.');
                description.push_str(class);
            }
        }
        description
    }

    #[cfg(test)]
    pub fn clicks(&self) -> &[Click] {
        &self.clicks
    }

    #[cfg(test)]
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    #[cfg(test)]
    pub fn set_attribute(&mut self, node: HtmlNode, name: &str, value: Option<&str>) {
        let Some(element) = self.elements.get_mut(node.0) else {
            return;
        };
        match value {
            Some(value) => element.attributes.insert(name.to_string(), value.to_string()),
            None => element.attributes.remove(name),
        };
    }

    fn reload(&mut self, path: &Path) -> anyhow::Result<()> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to reload page {}", path.display()))?;
        self.html = Html::parse_document(&contents);
        self.elements = index_elements(&self.html);
        Ok(())
    }

    fn matches<'a>(&'a self, selector: &str) -> impl Iterator<Item = usize> + 'a {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!("Ignoring invalid selector {selector:?}: {err:?}");
                None
            }
        };
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .filter(move |(_, element)| parsed.as_ref().is_some_and(|s| s.matches(element)))
            .map(|(position, _)| position)
    }

    fn ancestors(&self, position: usize) -> impl Iterator<Item = &ElementData> {
        let mut next = Some(position);
        std::iter::from_fn(move || {
            let element = self.elements.get(next?)?;
            next = element.parent;
            Some(element)
        })
    }
}

impl Document for HtmlDocument {
    type Node = HtmlNode;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn refresh(&mut self) -> anyhow::Result<()> {
        let Some(source) = &self.source else {
            return Ok(());
        };
        let path = source.path.clone();
        let stamp = file_stamp(&path);
        if stamp.is_some() && stamp == source.stamp {
            return Ok(());
        }
        self.reload(&path)?;
        info!("Reloaded page {}", path.display());
        if let Some(source) = &mut self.source {
            source.stamp = stamp;
        }
        Ok(())
    }

    fn query(&self, selector: &str) -> Option<HtmlNode> {
        self.matches(selector).next().map(HtmlNode)
    }

    fn query_in(&self, node: HtmlNode, selector: &str) -> Option<HtmlNode> {
        self.matches(selector)
            .filter(|&position| position > node.0)
            .find(|&position| {
                let mut parent = self.elements.get(position).and_then(|e| e.parent);
                while let Some(current) = parent {
                    if current == node.0 {
                        return true;
                    }
                    parent = self.elements.get(current).and_then(|e| e.parent);
                }
                false
            })
            .map(HtmlNode)
    }

    fn attribute(&self, node: HtmlNode, name: &str) -> Option<String> {
        self.elements.get(node.0)?.attributes.get(name).cloned()
    }

    fn text(&self, node: HtmlNode) -> String {
        self.elements
            .get(node.0)
            .map(|element| element.text.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, node: HtmlNode) -> bool {
        self.ancestors(node.0).all(|element| {
            !element.attributes.contains_key("hidden")
                && element.styles.get("display").map(String::as_str) != Some("none")
        })
    }

    fn style(&self, node: HtmlNode, property: &str) -> Option<String> {
        self.elements.get(node.0)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, node: HtmlNode, property: &str, value: Option<&str>) {
        let Some(element) = self.elements.get_mut(node.0) else {
            return;
        };
        match value {
            Some(value) => element.styles.insert(property.to_string(), value.to_string()),
            None => element.styles.remove(property),
        };
    }

    fn click_at(&mut self, node: HtmlNode, x: f64, y: f64) {
        let click = Click { node, x, y };
        info!(
            "Click on {} at ({:.3}, {:.3})",
            self.describe(click.node),
            click.x,
            click.y
        );
        if self.clicks.len() == CLICK_HISTORY {
            self.clicks.remove(0);
        }
        self.clicks.push(click);
    }
}

fn index_elements(html: &Html) -> Vec<ElementData> {
    let mut positions = HashMap::new();
    let mut elements = Vec::new();
    for element in html.root_element().descendants().filter_map(ElementRef::wrap) {
        let parent = element
            .parent()
            .and_then(|parent| positions.get(&parent.id()).copied());
        positions.insert(element.id(), elements.len());

        let attributes: HashMap<String, String> = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let styles = attributes
            .get("style")
            .map(|style| parse_inline_style(style))
            .unwrap_or_default();

        elements.push(ElementData {
            tag: element.value().name().to_string(),
            attributes,
            styles,
            text: element.text().collect(),
            parent,
        });
    }
    elements
}

fn parse_inline_style(style: &str) -> HashMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(property, value)| {
            (
                property.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            )
        })
        .filter(|(property, _)| !property.is_empty())
        .collect()
}

fn file_stamp(path: &Path) -> Option<FileStamp> {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
  <div id="player" style="display: block">
    <button id="play" class="control primary" title="Play">Play</button>
    <button id="next" class="control" disabled>Next</button>
    <div id="menu" style="display:none; opacity: 0">
      <span class="slider">Volume</span>
    </div>
  </div>
  <span class="slider">Outside</span>
</body></html>
"#;

    #[test]
    fn should_query_first_match_in_document_order() {
        // given
        let document = HtmlDocument::parse(PAGE);

        // when
        let slider = document.query(".slider").unwrap();

        // then
        assert_eq!(document.text(slider), "Volume");
        assert_eq!(document.describe(slider), "span.slider");
    }

    #[test]
    fn should_query_inside_subtree_only() {
        // given
        let document = HtmlDocument::parse(PAGE);
        let play = document.query("#play").unwrap();
        let menu = document.query("#menu").unwrap();

        // when
        let inside_menu = document.query_in(menu, ".slider");
        let inside_play = document.query_in(play, ".slider");

        // then
        assert_eq!(inside_menu, document.query(".slider"));
        assert_eq!(inside_play, None);
    }

    #[test]
    fn should_read_attributes_and_disabled_flag() {
        // given
        let document = HtmlDocument::parse(PAGE);
        let play = document.query("#play").unwrap();
        let next = document.query("#next").unwrap();

        // then
        assert_eq!(document.attribute(play, "title").as_deref(), Some("Play"));
        assert!(!document.is_disabled(play));
        assert!(document.is_disabled(next));
        assert_eq!(document.describe(play), "button#play.control.primary");
    }

    #[test]
    fn should_treat_hidden_ancestors_as_invisible() {
        // given
        let mut document = HtmlDocument::parse(PAGE);
        let menu = document.query("#menu").unwrap();
        let slider = document.query(".slider").unwrap();
        assert!(!document.is_visible(slider));

        // when
        document.set_style(menu, "display", Some("block"));

        // then
        assert!(document.is_visible(slider));
        assert_eq!(document.style(menu, "opacity").as_deref(), Some("0"));
    }

    #[test]
    fn should_record_clicks() {
        // given
        let mut document = HtmlDocument::parse(PAGE);
        let play = document.query("#play").unwrap();

        // when
        document.click(play);
        document.click_at(play, 0.25, 0.5);

        // then
        assert_eq!(
            document.clicks(),
            &[
                Click {
                    node: play,
                    x: 0.5,
                    y: 0.5
                },
                Click {
                    node: play,
                    x: 0.25,
                    y: 0.5
                }
            ]
        );
    }

    #[test]
    fn should_ignore_invalid_selectors() {
        // given
        let document = HtmlDocument::parse(PAGE);

        // then
        assert_eq!(document.query("##"), None);
    }

    #[test]
    fn should_reload_changed_file() {
        // given
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"<p class=\"title\">First</p>").unwrap();
        let mut document = HtmlDocument::from_path(file.path()).unwrap();
        assert_eq!(document.query_text(".title").as_deref(), Some("First"));

        // when
        fs::write(file.path(), "<p class=\"title\">Second</p>").unwrap();
        document.refresh().unwrap();

        // then
        assert_eq!(document.query_text(".title").as_deref(), Some("Second"));
    }

    #[test]
    fn should_keep_only_recent_clicks() {
        // given
        let mut document = HtmlDocument::parse(PAGE);
        let play = document.query("#play").unwrap();

        // when
        for step in 0..10_000 {
            document.click_at(play, f64::from(step) / 10_000.0, 0.5);
        }

        // then
        assert_eq!(document.clicks().len(), CLICK_HISTORY);
        assert_eq!(document.clicks().last().unwrap().x, 0.9999);
    }
}
