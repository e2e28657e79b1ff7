use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use shared::{FeedClient, Store, TrackedInstrument};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Periodic price sampler.
///
/// On each tick every tracked instrument is fetched concurrently; the tick
/// commits to the store only when every fetch produced a price, under one
/// shared timestamp. A tick where any fetch fails inserts nothing. The loop
/// never terminates from an operational error, only from cancellation.
///
/// The sampler owns the feed client; the network resource is released
/// exactly once, when the loop task ends.
pub struct Sampler {
    store: Store,
    feed: FeedClient,
    instruments: Vec<TrackedInstrument>,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        store: Store,
        feed: FeedClient,
        instruments: Vec<TrackedInstrument>,
        interval: Duration,
    ) -> Self {
        Sampler {
            store,
            feed,
            instruments,
            interval,
        }
    }

    /// Spawn the tick loop and hand back its shutdown handle.
    pub fn start(self) -> SamplerHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        info!("Sampler started");
        SamplerHandle {
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.run_tick().await,
            }
        }
        info!("Sampler loop exiting");
    }

    /// One acquisition cycle: fetch every instrument, then commit all of
    /// them or none of them.
    pub async fn run_tick(&self) {
        let fetches = self.instruments.iter().map(|instrument| async move {
            (instrument, self.feed.fetch_price(&instrument.endpoint).await)
        });
        let results = join_all(fetches).await;

        let mut sample = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (instrument, price) in results {
            match price {
                Some(price) => sample.push((instrument, price)),
                None => failed.push(instrument.name.as_str()),
            }
        }

        if !failed.is_empty() {
            warn!(
                "Skipping tick, failed to fetch price for: {}",
                failed.join(", ")
            );
            return;
        }

        let observed_at = Utc::now().timestamp();
        for (instrument, price) in &sample {
            if let Err(err) = self.store.insert(&instrument.name, *price, observed_at).await {
                error!("Failed to store sample for {}: {}", instrument.name, err);
                return;
            }
        }

        let summary: Vec<String> = sample
            .iter()
            .map(|(instrument, price)| format!("{}: {}", instrument.name, price))
            .collect();
        info!("Saved {} at {}", summary.join(", "), observed_at);
    }
}

/// Handle to a running sampler.
pub struct SamplerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Cancel the loop and wait for it to exit. An in-flight tick runs to
    /// its next suspension point, so this returns within one tick's
    /// latency. Calling again after the loop has stopped is a no-op.
    pub async fn shutdown(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.cancel.cancel();
        if let Err(err) = task.await {
            error!("Sampler task failed: {}", err);
        }
        info!("Sampler shutdown complete");
    }
}
