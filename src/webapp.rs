use std::{collections::HashMap, future::Future};

use log::{debug, info, warn};

use crate::{
    actions::{ActionDispatcher, PlayerAction},
    dom::Document,
    elements::{ElementLocator, Layout},
    extractor::StateExtractor,
    host::Host,
    preferences::{ConfigStore, ConfigValue, FormEntry, PreferenceBridge},
    rating::{RatingController, RatingOutcome, RatingThresholds},
};

/// Hooks a site integration provides to the session. Everything except `update` is
/// optional.
pub trait WebApp<D: Document, H: Host> {
    fn on_ready(&mut self, _doc: &mut D, _host: &mut H) {}

    fn on_action(&mut self, _doc: &mut D, _host: &mut H, _name: &str, _param: Option<f64>) {}

    fn on_rating_set(&mut self, _doc: &mut D, _host: &mut H, _rating: f64) {}

    fn on_config_changed(&mut self, _key: &str) -> impl Future<Output = ()> {
        async {}
    }

    /// Mirrors the page into the host. Called once per poll cycle.
    fn update(&mut self, doc: &mut D, host: &mut H) -> anyhow::Result<()>;
}

pub struct YoutubeMusic<S> {
    locator: ElementLocator,
    rating: RatingController,
    preferences: PreferenceBridge<S>,
}

impl<S: ConfigStore> YoutubeMusic<S> {
    pub fn new(
        layout: Layout,
        thresholds: RatingThresholds,
        preferences: PreferenceBridge<S>,
    ) -> Self {
        Self {
            locator: ElementLocator::new(layout),
            rating: RatingController::new(thresholds, layout.pressed_attribute),
            preferences,
        }
    }

    pub async fn load_preferences(&mut self) {
        self.preferences.load().await;
    }

    pub fn append_preferences(
        &self,
        values: &mut HashMap<String, ConfigValue>,
        entries: &mut Vec<FormEntry>,
    ) {
        self.preferences.append_form(values, entries);
    }
}

impl<S, D, H> WebApp<D, H> for YoutubeMusic<S>
where
    S: ConfigStore,
    D: Document,
    H: Host,
{
    fn on_ready(&mut self, _doc: &mut D, _host: &mut H) {
        info!("Page is ready, starting to mirror the player");
    }

    fn on_action(&mut self, doc: &mut D, _host: &mut H, name: &str, param: Option<f64>) {
        let Some(action) = PlayerAction::from_name(name) else {
            debug!("Ignoring unknown action {name:?}");
            return;
        };
        if !ActionDispatcher::new(&self.locator).dispatch(doc, action, param) {
            debug!("Action {name} had nothing to act on");
        }
    }

    fn on_rating_set(&mut self, doc: &mut D, host: &mut H, rating: f64) {
        let elements = self.locator.locate(&*doc);
        match self.rating.apply(doc, &elements, rating) {
            RatingOutcome::Clicked(thumb) => debug!("Rating {rating} applied via {thumb:?}"),
            RatingOutcome::Unchanged => debug!("Rating {rating} already applied"),
            RatingOutcome::Unsupported => {
                let message = self.rating.unsupported_message(rating);
                warn!("{message}");
                host.show_warning(&message);
            }
        }
    }

    async fn on_config_changed(&mut self, key: &str) {
        self.preferences.on_config_changed(key).await;
    }

    fn update(&mut self, doc: &mut D, host: &mut H) -> anyhow::Result<()> {
        let snapshot = StateExtractor::new(&self.locator, &self.rating)
            .extract(doc, self.preferences.thumb_never_toggles());
        if snapshot.advertisement {
            debug!("Advertisement on screen, track metadata withheld");
        }
        snapshot.publish(host);
        Ok(())
    }
}
