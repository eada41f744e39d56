use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ultra_low_latency_md_engine::config::{EngineConfig, SimulationConfig};
use ultra_low_latency_md_engine::simulate::SimulatedFeed;
use ultra_low_latency_md_engine::Engine;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_toml_file(std::path::Path::new(&path))?,
        None => EngineConfig {
            simulation: SimulationConfig {
                enabled: true,
                symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOG".to_string()],
                ticks_per_second: 20,
                initial_price: 150.0,
                max_jitter_percent: 1.5,
            },
            ..EngineConfig::default()
        },
    };

    let engine = Arc::new(Engine::new(config.clone()));
    engine.start();
    tracing::info!(partitions = engine.get_processing_statistics().active_symbols, "engine started");

    let running = Arc::new(AtomicBool::new(true));
    let feed = SimulatedFeed::new(config.simulation);
    let feed_handles = feed.spawn(engine.clone(), running.clone());

    for _ in 0..10 {
        std::thread::sleep(Duration::from_secs(1));
        let health = engine.health();
        println!(
            "health={:?} total_processed={} anomalies={} active_symbols={} queue_size={} throughput/s={}",
            health.health,
            health.statistics.total_processed,
            health.statistics.anomalies_detected,
            health.statistics.active_symbols,
            health.statistics.queue_size,
            health.statistics.throughput_per_second,
        );
    }

    running.store(false, Ordering::Relaxed);
    for handle in feed_handles {
        let _ = handle.join();
    }

    engine.stop();
    println!("final statistics: {:?}", engine.get_processing_statistics());
    for anomaly in engine.get_recent_anomalies(10, None) {
        println!(
            "{} {} -> {} ({}) at {}",
            anomaly.symbol, anomaly.old_price, anomaly.new_price, anomaly.severity, anomaly.detected_at
        );
    }

    Ok(())
}
