use serde::Deserialize;

use crate::{dom::Document, elements::ElementSet};

const PRESSED: &str = "true";

/// Boundaries between the continuous rating scale and the two thumb buttons.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingThresholds {
    pub unrate_below: f64,
    pub dislike_max: f64,
    pub like_min: f64,
    pub dislike_value: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            unrate_below: 0.01,
            dislike_max: 0.41,
            like_min: 0.79,
            dislike_value: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    Unchanged,
    Clicked(Thumb),
    Unsupported,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbState {
    pub enabled: bool,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingController {
    thresholds: RatingThresholds,
    pressed_attribute: &'static str,
}

impl RatingController {
    pub fn new(thresholds: RatingThresholds, pressed_attribute: &'static str) -> Self {
        Self {
            thresholds,
            pressed_attribute,
        }
    }

    pub fn is_pressed<D: Document>(&self, doc: &D, node: Option<D::Node>) -> bool {
        node.and_then(|node| doc.attribute(node, self.pressed_attribute))
            .is_some_and(|value| value == PRESSED)
    }

    /// Like wins if the page ever reports both buttons as pressed.
    pub fn read<D: Document>(&self, doc: &D, elements: &ElementSet<D::Node>) -> Option<f64> {
        if elements.like.is_none() && elements.dislike.is_none() {
            return None;
        }
        let rating = if self.is_pressed(doc, elements.like) {
            1.0
        } else if self.is_pressed(doc, elements.dislike) {
            self.thresholds.dislike_value
        } else {
            0.0
        };
        Some(rating)
    }

    pub fn apply<D: Document>(
        &self,
        doc: &mut D,
        elements: &ElementSet<D::Node>,
        rating: f64,
    ) -> RatingOutcome {
        let like_pressed = self.is_pressed(&*doc, elements.like);
        let dislike_pressed = self.is_pressed(&*doc, elements.dislike);

        let target = if rating < self.thresholds.unrate_below {
            if like_pressed {
                elements.like.map(|node| (Thumb::Like, node))
            } else if dislike_pressed {
                elements.dislike.map(|node| (Thumb::Dislike, node))
            } else {
                None
            }
        } else if rating <= self.thresholds.dislike_max {
            elements
                .dislike
                .filter(|_| !dislike_pressed)
                .map(|node| (Thumb::Dislike, node))
        } else if rating >= self.thresholds.like_min {
            elements
                .like
                .filter(|_| !like_pressed)
                .map(|node| (Thumb::Like, node))
        } else {
            return RatingOutcome::Unsupported;
        };

        match target {
            Some((thumb, node)) => {
                doc.click(node);
                RatingOutcome::Clicked(thumb)
            }
            None => RatingOutcome::Unchanged,
        }
    }

    /// Enabled/pressed flags of the thumbs up and thumbs down actions. With
    /// `never_toggles` a pressed thumb cannot be clicked again to clear it.
    pub fn thumb_states<D: Document>(
        &self,
        doc: &D,
        elements: &ElementSet<D::Node>,
        never_toggles: bool,
    ) -> (ThumbState, ThumbState) {
        let state = |node: Option<D::Node>| {
            let pressed = self.is_pressed(doc, node);
            ThumbState {
                enabled: node.is_some() && !(never_toggles && pressed),
                pressed,
            }
        };
        (state(elements.like), state(elements.dislike))
    }

    pub fn unsupported_message(&self, rating: f64) -> String {
        format!(
            "Rating {rating:.2} has no equivalent on this page. Use a value below {:.2} to clear \
             the rating, at most {:.2} for thumbs down or at least {:.2} for thumbs up.",
            self.thresholds.unrate_below, self.thresholds.dislike_max, self.thresholds.like_min
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        elements::{ElementLocator, Layout},
        html::HtmlDocument,
    };

    fn page(like: &str, dislike: &str) -> String {
        format!(
            r#"<div id="like-button-renderer">
                <div id="button-shape-like"><button aria-pressed="{like}"></button></div>
                <div id="button-shape-dislike"><button aria-pressed="{dislike}"></button></div>
            </div>"#
        )
    }

    fn setup(like: &str, dislike: &str) -> (HtmlDocument, ElementLocator, RatingController) {
        let doc = HtmlDocument::parse(&page(like, dislike));
        let locator = ElementLocator::new(Layout::CURRENT);
        let controller = RatingController::new(RatingThresholds::default(), "aria-pressed");
        (doc, locator, controller)
    }

    /// Mimics the page flipping a thumb after it was clicked.
    fn toggle_clicked(doc: &mut HtmlDocument, controller: &RatingController) {
        let clicked: Vec<_> = doc.clicks().iter().map(|click| click.node).collect();
        for node in clicked {
            let pressed = controller.is_pressed(&*doc, Some(node));
            doc.set_attribute(
                node,
                "aria-pressed",
                Some(if pressed { "false" } else { "true" }),
            );
        }
    }

    #[test]
    fn should_read_rating_from_pressed_buttons() {
        let cases = [
            ("true", "false", 1.0),
            ("false", "true", 0.20),
            ("false", "false", 0.0),
            ("true", "true", 1.0),
        ];
        for (like, dislike, expected) in cases {
            // given
            let (doc, locator, controller) = setup(like, dislike);

            // when
            let rating = controller.read(&doc, &locator.locate(&doc));

            // then
            assert_eq!(rating, Some(expected), "like={like} dislike={dislike}");
        }
    }

    #[test]
    fn should_have_no_rating_without_buttons() {
        // given
        let doc = HtmlDocument::parse("<div></div>");
        let locator = ElementLocator::new(Layout::CURRENT);
        let controller = RatingController::new(RatingThresholds::default(), "aria-pressed");

        // then
        assert_eq!(controller.read(&doc, &locator.locate(&doc)), None);
    }

    #[test]
    fn should_clear_like_when_rating_zero() {
        // given
        let (mut doc, locator, controller) = setup("true", "false");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 0.0);
        toggle_clicked(&mut doc, &controller);

        // then
        assert_eq!(outcome, RatingOutcome::Clicked(Thumb::Like));
        let elements = locator.locate(&doc);
        assert!(!controller.is_pressed(&doc, elements.like));
        assert!(!controller.is_pressed(&doc, elements.dislike));
        assert_eq!(controller.read(&doc, &elements), Some(0.0));
    }

    #[test]
    fn should_clear_dislike_when_rating_zero() {
        // given
        let (mut doc, locator, controller) = setup("false", "true");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 0.005);

        // then
        assert_eq!(outcome, RatingOutcome::Clicked(Thumb::Dislike));
        assert_eq!(doc.clicks()[0].node, elements.dislike.unwrap());
    }

    #[test]
    fn should_do_nothing_when_clearing_unrated_track() {
        // given
        let (mut doc, locator, controller) = setup("false", "false");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 0.0);

        // then
        assert_eq!(outcome, RatingOutcome::Unchanged);
        assert!(doc.clicks().is_empty());
    }

    #[test]
    fn should_press_like_for_full_rating() {
        // given
        let (mut doc, locator, controller) = setup("false", "false");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 1.0);
        toggle_clicked(&mut doc, &controller);

        // then
        assert_eq!(outcome, RatingOutcome::Clicked(Thumb::Like));
        let elements = locator.locate(&doc);
        assert!(controller.is_pressed(&doc, elements.like));
        assert!(!controller.is_pressed(&doc, elements.dislike));
        assert_eq!(controller.read(&doc, &elements), Some(1.0));
    }

    #[test]
    fn should_press_dislike_for_low_rating() {
        // given
        let (mut doc, locator, controller) = setup("false", "false");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 0.20);
        toggle_clicked(&mut doc, &controller);

        // then
        assert_eq!(outcome, RatingOutcome::Clicked(Thumb::Dislike));
        let elements = locator.locate(&doc);
        assert!(controller.is_pressed(&doc, elements.dislike));
        assert!(!controller.is_pressed(&doc, elements.like));
        assert_eq!(controller.read(&doc, &elements), Some(0.20));
    }

    #[test]
    fn should_not_click_already_pressed_button() {
        // given
        let (mut doc, locator, controller) = setup("true", "false");
        let elements = locator.locate(&doc);

        // when
        let outcome = controller.apply(&mut doc, &elements, 0.9);

        // then
        assert_eq!(outcome, RatingOutcome::Unchanged);
        assert!(doc.clicks().is_empty());
    }

    #[test]
    fn should_reject_middle_ratings() {
        for rating in [0.5, 0.42, 0.78] {
            // given
            let (mut doc, locator, controller) = setup("false", "false");
            let elements = locator.locate(&doc);

            // when
            let outcome = controller.apply(&mut doc, &elements, rating);

            // then
            assert_eq!(outcome, RatingOutcome::Unsupported, "rating={rating}");
            assert!(doc.clicks().is_empty());
        }
    }

    #[test]
    fn should_disable_pressed_thumb_when_never_toggling() {
        // given
        let (doc, locator, controller) = setup("true", "false");
        let elements = locator.locate(&doc);

        // when
        let (up, down) = controller.thumb_states(&doc, &elements, true);

        // then
        assert_eq!(
            up,
            ThumbState {
                enabled: false,
                pressed: true
            }
        );
        assert_eq!(
            down,
            ThumbState {
                enabled: true,
                pressed: false
            }
        );
    }

    #[test]
    fn should_keep_pressed_thumb_enabled_when_toggling_allowed() {
        // given
        let (doc, locator, controller) = setup("true", "false");
        let elements = locator.locate(&doc);

        // when
        let (up, _) = controller.thumb_states(&doc, &elements, false);

        // then
        assert!(up.enabled);
        assert!(up.pressed);
    }
}
