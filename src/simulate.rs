//! A synthetic feed adapter: a random walk per configured symbol,
//! calling `Engine::enqueue_update` like any other producer (§6
//! simulation sub-config; SPEC_FULL "Synthetic feed adapter"). The
//! engine has no special awareness of this caller — it's routed
//! through the same producer contract as a real exchange feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use crate::config::SimulationConfig;
use crate::engine::Engine;

pub struct SimulatedFeed {
    config: SimulationConfig,
}

impl SimulatedFeed {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Spawns one producer thread per configured symbol. Each walks
    /// the symbol's price by up to `max_jitter_percent` per tick and
    /// calls `engine.enqueue_update`; `Rejected(Backpressure)` is
    /// logged and dropped, matching "callers may retry" (§4.1) without
    /// this demo adapter implementing its own retry policy.
    pub fn spawn(&self, engine: Arc<Engine>, running: Arc<AtomicBool>) -> Vec<JoinHandle<()>> {
        if !self.config.enabled {
            return Vec::new();
        }

        let tick_interval = Duration::from_secs_f64(1.0 / self.config.ticks_per_second.max(1) as f64);

        self.config
            .symbols
            .iter()
            .cloned()
            .map(|symbol| {
                let engine = engine.clone();
                let running = running.clone();
                let initial_price = self.config.initial_price;
                let max_jitter_percent = self.config.max_jitter_percent;

                thread::Builder::new()
                    .name(format!("sim-feed-{symbol}"))
                    .spawn(move || {
                        let mut price = initial_price;
                        let mut rng = rand::thread_rng();
                        while running.load(Ordering::Relaxed) {
                            let jitter_pct = rng.gen_range(-max_jitter_percent..=max_jitter_percent);
                            price = (price * (1.0 + jitter_pct / 100.0)).max(0.01);

                            match engine.enqueue_update(&symbol, price, Utc::now()) {
                                Ok(()) => {}
                                Err(err) => tracing::debug!(%symbol, %err, "simulated tick dropped"),
                            }

                            thread::sleep(tick_interval);
                        }
                    })
                    .expect("failed to spawn OS thread for simulated feed")
            })
            .collect()
    }
}
