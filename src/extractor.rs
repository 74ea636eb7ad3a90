use log::debug;

use crate::{
    actions::CustomAction,
    dom::{non_empty, Document},
    elements::ElementLocator,
    host::Host,
    playback::{TrackMetadata, TransportState},
    rating::{RatingController, ThumbState},
    time::TimeInfo,
};

const ARTIST_DELIMITER: char = '•';

/// Everything published to the host for one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub track: TrackMetadata,
    pub transport: TransportState,
    pub position: Option<String>,
    pub volume: Option<f64>,
    pub thumbs_up: ThumbState,
    pub thumbs_down: ThumbState,
    pub advertisement: bool,
}

impl Snapshot {
    pub fn publish(self, host: &mut impl Host) {
        host.set_track(self.track);
        if let Some(position) = &self.position {
            host.set_track_position(position);
        }

        let transport = self.transport;
        host.set_playback_state(transport.status);
        host.set_can_go_prev(transport.can_go_prev);
        host.set_can_go_next(transport.can_go_next);
        host.set_can_play(transport.can_play);
        host.set_can_pause(transport.can_pause);
        host.set_can_seek(transport.can_seek);
        host.update_volume(self.volume);
        host.set_can_change_volume(transport.can_change_volume);
        host.set_can_rate(transport.can_rate);

        host.set_action_enabled(CustomAction::ThumbsUp, self.thumbs_up.enabled);
        host.set_action_state(CustomAction::ThumbsUp, self.thumbs_up.pressed);
        host.set_action_enabled(CustomAction::ThumbsDown, self.thumbs_down.enabled);
        host.set_action_state(CustomAction::ThumbsDown, self.thumbs_down.pressed);
    }
}

pub struct StateExtractor<'a> {
    locator: &'a ElementLocator,
    rating: &'a RatingController,
}

impl<'a> StateExtractor<'a> {
    pub fn new(locator: &'a ElementLocator, rating: &'a RatingController) -> Self {
        Self { locator, rating }
    }

    /// Reads one consistent snapshot of the page. A visible "skip ad" button gets
    /// clicked on the way.
    pub fn extract<D: Document>(&self, doc: &mut D, thumb_never_toggles: bool) -> Snapshot {
        let layout = self.locator.layout();
        let elements = self.locator.locate(&*doc);

        let skip_ad = elements.skip_ad.filter(|&node| doc.is_visible(node));
        let ad_marker = layout
            .ad_marker
            .and_then(|selector| doc.query(selector))
            .is_some_and(|node| doc.is_visible(node));
        if let Some(skip_ad) = skip_ad {
            debug!("Skipping advertisement");
            doc.click(skip_ad);
        }
        let advertisement = skip_ad.is_some() || ad_marker;

        let mut position = None;
        let track = if advertisement {
            TrackMetadata::empty()
        } else {
            let length = doc
                .query_text(layout.time_info)
                .and_then(|text| TimeInfo::parse(&text))
                .map(|time| {
                    position = Some(time.position);
                    time.total
                });
            TrackMetadata {
                title: doc.query_text(layout.title),
                artist: doc
                    .query_text(layout.artist)
                    .and_then(|artist| first_artist(&artist)),
                album: None,
                art_location: doc.query_attribute(layout.art, "src").and_then(non_empty),
                rating: self.rating.read(&*doc, &elements),
                length,
            }
        };

        let volume = doc
            .query_attribute(layout.volume_value, "value")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .map(|value| (value / 100.0).clamp(0.0, 1.0));
        let (thumbs_up, thumbs_down) =
            self.rating.thumb_states(&*doc, &elements, thumb_never_toggles);

        Snapshot {
            track,
            transport: TransportState::from(&elements),
            position,
            volume,
            thumbs_up,
            thumbs_down,
            advertisement,
        }
    }
}

fn first_artist(byline: &str) -> Option<String> {
    byline.split(ARTIST_DELIMITER).next().and_then(non_empty)
}
