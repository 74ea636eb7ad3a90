use std::time::Duration;

use anyhow::Context;
use log::{debug, error};
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};

use crate::{
    dom::Document,
    events::{EventBus, EventKind, HostEvent, SubscriptionId},
    host::Host,
    webapp::WebApp,
};

/// The one page being mirrored: the document, the host model it feeds and the site
/// integration in between.
pub struct Session<D, H, A> {
    document: D,
    host: H,
    app: A,
    bus: EventBus,
    poll_interval: Duration,
    events_tx: mpsc::UnboundedSender<HostEvent>,
    events_rx: mpsc::UnboundedReceiver<HostEvent>,
    subscriptions: Vec<SubscriptionId>,
}

impl<D, H, A> Session<D, H, A>
where
    D: Document,
    H: Host,
    A: WebApp<D, H>,
{
    pub fn new(document: D, host: H, app: A, bus: EventBus, poll_interval: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            document,
            host,
            app,
            bus,
            poll_interval,
            events_tx,
            events_rx,
            subscriptions: Vec::new(),
        }
    }

    /// Polls the page until the process ends. Host events are handled between cycles and
    /// never move the next cycle's deadline.
    pub async fn run(&mut self) {
        self.wait_until_ready().await;
        self.start();

        loop {
            self.run_cycle();
            let next_cycle = Instant::now() + self.poll_interval;
            loop {
                tokio::select! {
                    _ = sleep_until(next_cycle) => break,
                    Some(event) = self.events_rx.recv() => self.handle_event(event).await,
                }
            }
        }
    }

    async fn wait_until_ready(&mut self) {
        if self.document.ready_state().is_ready() {
            return;
        }
        debug!("Waiting for the page to become ready...");
        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
        let subscription = self.bus.subscribe(EventKind::ReadyStateChanged, ready_tx);
        while let Some(event) = ready_rx.recv().await {
            if let HostEvent::ReadyStateChanged(state) = event {
                debug!("Page ready state changed to {state:?}");
                if state.is_ready() {
                    break;
                }
            }
        }
        self.bus.unsubscribe(subscription);
    }

    fn start(&mut self) {
        for kind in [
            EventKind::ActionActivated,
            EventKind::RatingSet,
            EventKind::ConfigChanged,
        ] {
            let id = self.bus.subscribe(kind, self.events_tx.clone());
            self.subscriptions.push(id);
        }
        self.app.on_ready(&mut self.document, &mut self.host);
    }

    fn run_cycle(&mut self) {
        let result = self
            .document
            .refresh()
            .context("Failed to refresh the page")
            .and_then(|()| self.app.update(&mut self.document, &mut self.host));
        if let Err(err) = result {
            error!("Poll cycle failed: {err:?}");
        }
    }

    /// Page interactions always see the current page, not the one of the last cycle.
    fn refresh_for_dispatch(&mut self) -> bool {
        match self.document.refresh() {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to refresh the page before dispatch: {err:?}");
                false
            }
        }
    }

    async fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::ActionActivated { name, param } => {
                if self.refresh_for_dispatch() {
                    self.app
                        .on_action(&mut self.document, &mut self.host, &name, param)
                }
            }
            HostEvent::RatingSet(rating) => {
                if self.refresh_for_dispatch() {
                    self.app
                        .on_rating_set(&mut self.document, &mut self.host, rating)
                }
            }
            HostEvent::ConfigChanged(key) => self.app.on_config_changed(&key).await,
            HostEvent::ReadyStateChanged(state) => {
                debug!("Ignoring ready state {state:?} of a running session")
            }
        }
    }
}

impl<D, H, A> Drop for Session<D, H, A> {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
    }
}
