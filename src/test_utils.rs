use std::collections::HashMap;

use crate::{
    actions::CustomAction,
    host::Host,
    playback::{PlaybackStatus, TrackMetadata},
};

/// Host that remembers everything published to it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub tracks: Vec<TrackMetadata>,
    pub status: Option<PlaybackStatus>,
    pub flags: HashMap<&'static str, bool>,
    pub volume: Option<Option<f64>>,
    pub positions: Vec<String>,
    pub actions_enabled: HashMap<CustomAction, bool>,
    pub actions_pressed: HashMap<CustomAction, bool>,
    pub warnings: Vec<String>,
}

impl RecordingHost {
    pub const TRANSPORT_FLAGS: [&'static str; 7] = [
        "can_go_prev",
        "can_go_next",
        "can_play",
        "can_pause",
        "can_seek",
        "can_change_volume",
        "can_rate",
    ];

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }
}

impl Host for RecordingHost {
    fn set_track(&mut self, track: TrackMetadata) {
        self.tracks.push(track);
    }

    fn set_playback_state(&mut self, status: PlaybackStatus) {
        self.status = Some(status);
    }

    fn set_can_go_prev(&mut self, value: bool) {
        self.flags.insert("can_go_prev", value);
    }

    fn set_can_go_next(&mut self, value: bool) {
        self.flags.insert("can_go_next", value);
    }

    fn set_can_play(&mut self, value: bool) {
        self.flags.insert("can_play", value);
    }

    fn set_can_pause(&mut self, value: bool) {
        self.flags.insert("can_pause", value);
    }

    fn set_can_seek(&mut self, value: bool) {
        self.flags.insert("can_seek", value);
    }

    fn set_can_change_volume(&mut self, value: bool) {
        self.flags.insert("can_change_volume", value);
    }

    fn set_can_rate(&mut self, value: bool) {
        self.flags.insert("can_rate", value);
    }

    fn update_volume(&mut self, volume: Option<f64>) {
        self.volume = Some(volume);
    }

    fn set_track_position(&mut self, position: &str) {
        self.positions.push(position.to_string());
    }

    fn set_action_enabled(&mut self, action: CustomAction, enabled: bool) {
        self.actions_enabled.insert(action, enabled);
    }

    fn set_action_state(&mut self, action: CustomAction, pressed: bool) {
        self.actions_pressed.insert(action, pressed);
    }

    fn show_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
