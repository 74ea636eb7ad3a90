use std::collections::HashMap;

use log::{debug, info, warn};

use crate::{
    actions::CustomAction,
    playback::{PlaybackStatus, TrackMetadata},
};

/// The player model the page is mirrored into.
pub trait Host {
    fn set_track(&mut self, track: TrackMetadata);
    fn set_playback_state(&mut self, status: PlaybackStatus);
    fn set_can_go_prev(&mut self, value: bool);
    fn set_can_go_next(&mut self, value: bool);
    fn set_can_play(&mut self, value: bool);
    fn set_can_pause(&mut self, value: bool);
    fn set_can_seek(&mut self, value: bool);
    fn set_can_change_volume(&mut self, value: bool);
    fn set_can_rate(&mut self, value: bool);
    fn update_volume(&mut self, volume: Option<f64>);
    fn set_track_position(&mut self, position: &str);
    fn set_action_enabled(&mut self, action: CustomAction, enabled: bool);
    fn set_action_state(&mut self, action: CustomAction, pressed: bool);

    /// Surfaces a message to the user directly.
    fn show_warning(&mut self, message: &str);
}

/// Logs every change of the published model. Repeated publications of the same value
/// are folded, which is the host's job rather than the extractor's.
#[derive(Debug, Default)]
pub struct LoggingHost {
    track: Option<TrackMetadata>,
    status: Option<PlaybackStatus>,
    flags: HashMap<&'static str, bool>,
    volume: Option<f64>,
    position: Option<String>,
    actions: HashMap<(CustomAction, &'static str), bool>,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_flag(&mut self, name: &'static str, value: bool) {
        if self.flags.insert(name, value) != Some(value) {
            debug!("{name} = {value}");
        }
    }

    fn set_action_flag(&mut self, action: CustomAction, flag: &'static str, value: bool) {
        if self.actions.insert((action, flag), value) != Some(value) {
            debug!("Action {action} {flag} = {value}");
        }
    }
}

impl Host for LoggingHost {
    fn set_track(&mut self, track: TrackMetadata) {
        if self.track.as_ref() == Some(&track) {
            return;
        }
        match serde_json::to_string(&track) {
            Ok(json) => info!("Track: {json}"),
            Err(_) => info!("Track: {track:?}"),
        }
        self.track = Some(track);
    }

    fn set_playback_state(&mut self, status: PlaybackStatus) {
        if self.status.replace(status) != Some(status) {
            info!("Playback state: {status:?}");
        }
    }

    fn set_can_go_prev(&mut self, value: bool) {
        self.set_flag("can_go_prev", value);
    }

    fn set_can_go_next(&mut self, value: bool) {
        self.set_flag("can_go_next", value);
    }

    fn set_can_play(&mut self, value: bool) {
        self.set_flag("can_play", value);
    }

    fn set_can_pause(&mut self, value: bool) {
        self.set_flag("can_pause", value);
    }

    fn set_can_seek(&mut self, value: bool) {
        self.set_flag("can_seek", value);
    }

    fn set_can_change_volume(&mut self, value: bool) {
        self.set_flag("can_change_volume", value);
    }

    fn set_can_rate(&mut self, value: bool) {
        self.set_flag("can_rate", value);
    }

    fn update_volume(&mut self, volume: Option<f64>) {
        if self.volume != volume {
            debug!("Volume: {volume:?}");
            self.volume = volume;
        }
    }

    fn set_track_position(&mut self, position: &str) {
        if self.position.as_deref() != Some(position) {
            debug!("Position: {position}");
            self.position = Some(position.to_string());
        }
    }

    fn set_action_enabled(&mut self, action: CustomAction, enabled: bool) {
        self.set_action_flag(action, "enabled", enabled);
    }

    fn set_action_state(&mut self, action: CustomAction, pressed: bool) {
        self.set_action_flag(action, "pressed", pressed);
    }

    fn show_warning(&mut self, message: &str) {
        warn!("{message}");
    }
}
