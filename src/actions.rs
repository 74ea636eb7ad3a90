use std::fmt;

use log::debug;

use crate::{
    dom::Document,
    elements::ElementLocator,
    time::{parse_time_usec, TimeInfo},
};

/// Actions this integration adds on top of the standard player vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomAction {
    ThumbsUp,
    ThumbsDown,
}

impl CustomAction {
    pub const fn name(self) -> &'static str {
        match self {
            CustomAction::ThumbsUp => "thumbs-up",
            CustomAction::ThumbsDown => "thumbs-down",
        }
    }
}

impl fmt::Display for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    TogglePlay,
    Play,
    Pause,
    Stop,
    PrevSong,
    NextSong,
    Seek,
    ChangeVolume,
    Custom(CustomAction),
}

impl PlayerAction {
    /// `None` for identifiers outside the known vocabulary; newer hosts may send those.
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "toggle-play" => Self::TogglePlay,
            "play" => Self::Play,
            "pause" => Self::Pause,
            "stop" => Self::Stop,
            "prev-song" => Self::PrevSong,
            "next-song" => Self::NextSong,
            "seek" => Self::Seek,
            "change-volume" => Self::ChangeVolume,
            "thumbs-up" => Self::Custom(CustomAction::ThumbsUp),
            "thumbs-down" => Self::Custom(CustomAction::ThumbsDown),
            _ => return None,
        };
        Some(action)
    }
}

/// Shows a hidden menu for as long as it lives and restores its inline style on drop.
struct MenuReveal<'d, D: Document> {
    doc: &'d mut D,
    menu: D::Node,
    display: Option<String>,
    opacity: Option<String>,
}

impl<'d, D: Document> MenuReveal<'d, D> {
    fn show(doc: &'d mut D, menu: D::Node) -> Self {
        let display = doc.style(menu, "display");
        let opacity = doc.style(menu, "opacity");
        doc.set_style(menu, "display", Some("block"));
        doc.set_style(menu, "opacity", Some("1"));
        Self {
            doc,
            menu,
            display,
            opacity,
        }
    }

    fn document(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: Document> Drop for MenuReveal<'_, D> {
    fn drop(&mut self) {
        self.doc
            .set_style(self.menu, "display", self.display.as_deref());
        self.doc
            .set_style(self.menu, "opacity", self.opacity.as_deref());
    }
}

pub struct ActionDispatcher<'a> {
    locator: &'a ElementLocator,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(locator: &'a ElementLocator) -> Self {
        Self { locator }
    }

    /// Performs the interaction for `action` and reports whether anything was clicked.
    /// Missing controls and unusable parameters are not errors.
    pub fn dispatch<D: Document>(
        &self,
        doc: &mut D,
        action: PlayerAction,
        param: Option<f64>,
    ) -> bool {
        let elements = self.locator.locate(&*doc);
        let target = match action {
            PlayerAction::TogglePlay => elements.pause.or(elements.play),
            PlayerAction::Play => elements.play,
            PlayerAction::Pause | PlayerAction::Stop => elements.pause,
            PlayerAction::PrevSong => elements.prev,
            PlayerAction::NextSong => elements.next,
            PlayerAction::Custom(CustomAction::ThumbsUp) => elements.like,
            PlayerAction::Custom(CustomAction::ThumbsDown) => elements.dislike,
            PlayerAction::Seek => {
                let Some(progress_bar) = elements.progress_bar else {
                    return false;
                };
                let Some(fraction) = param.and_then(|position| self.seek_fraction(&*doc, position))
                else {
                    debug!("Ignoring seek to {param:?}");
                    return false;
                };
                doc.click_at(progress_bar, fraction, 0.5);
                return true;
            }
            PlayerAction::ChangeVolume => {
                let Some(volume) = param.filter(|volume| volume.is_finite()) else {
                    return false;
                };
                let volume = volume.clamp(0.0, 1.0);
                return match (elements.expanding_menu, elements.volume_bar) {
                    (Some(menu), _) => {
                        let mut reveal = MenuReveal::show(doc, menu);
                        let slider = self.locator.expanded_volume_bar(&*reveal.document());
                        match slider {
                            Some(slider) => {
                                reveal.document().click_at(slider, volume, 0.5);
                                true
                            }
                            None => false,
                        }
                    }
                    (None, Some(volume_bar)) => {
                        doc.click_at(volume_bar, volume, 0.5);
                        true
                    }
                    (None, None) => false,
                };
            }
        };

        match target {
            Some(node) => {
                doc.click(node);
                true
            }
            None => {
                debug!("No control available for {action:?}");
                false
            }
        }
    }

    fn seek_fraction<D: Document>(&self, doc: &D, position: f64) -> Option<f64> {
        let time = doc
            .query_text(self.locator.layout().time_info)
            .and_then(|text| TimeInfo::parse(&text))?;
        seek_fraction(&time.total, position)
    }
}

/// Offset along the progress bar for `position` microseconds into a track of length
/// `total`, if the position lies within the track.
pub fn seek_fraction(total: &str, position: f64) -> Option<f64> {
    let total = parse_time_usec(total)? as f64;
    if total <= 0.0 || !(0.0..=total).contains(&position) {
        return None;
    }
    Some(position / total)
}
