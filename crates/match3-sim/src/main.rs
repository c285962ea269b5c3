//! Headless match-3 driver.
//!
//! Wires the engine, state machine, and event consumers together at a
//! single composition root, then plays random adjacent swaps with every
//! phase acknowledged immediately. Useful for soak-testing the core and
//! for eyeballing the event stream a real frontend would consume.

use match3_core::{BoardConfig, BoardEngine, BoardEvent};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Per-run counters fed by the event stream, standing in for the score/
/// audio/UI listeners a real frontend would register.
#[derive(Default)]
struct SimStats {
    accepted_swaps: u64,
    invalid_moves: u64,
    matches: u64,
    tiles_destroyed: u64,
    tiles_spawned: u64,
    largest_match: usize,
}

impl SimStats {
    fn consume(&mut self, events: &[BoardEvent], as_json: bool) {
        for event in events {
            if as_json {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => debug!(%err, "event not serializable"),
                }
            }
            match event {
                BoardEvent::InvalidMove => self.invalid_moves += 1,
                BoardEvent::MatchFound { count } => {
                    self.matches += 1;
                    self.largest_match = self.largest_match.max(*count);
                }
                BoardEvent::TileDestroyed { .. } => self.tiles_destroyed += 1,
                BoardEvent::TileSpawned { .. } => self.tiles_spawned += 1,
                _ => {}
            }
        }
    }
}

fn env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BoardConfig::new(
        env_var("BOARD_WIDTH", 8),
        env_var("BOARD_HEIGHT", 8),
        env_var("BOARD_COLORS", 6),
    );
    let moves: u64 = env_var("SIM_MOVES", 100);
    let seed: u64 = env_var("SIM_SEED", rand::random());
    let as_json = env_var("SIM_EVENTS_JSON", 0u8) == 1;

    info!(
        width = config.width,
        height = config.height,
        colors = config.color_count,
        moves,
        seed,
        "starting match-3 simulation"
    );

    let mut engine = BoardEngine::with_seed(config, seed)?;
    let mut stats = SimStats::default();
    stats.consume(&engine.start(), as_json);

    for turn in 0..moves {
        let (a, b) = engine.random_adjacent_pair();
        let mut events = engine.attempt_swap(a, b);
        if !engine.is_idle() {
            stats.accepted_swaps += 1;
            events.extend(engine.resolve_to_idle());
        }
        stats.consume(&events, as_json);
        debug!(turn, %a, %b, events = events.len(), "turn resolved");
    }

    info!(
        accepted = stats.accepted_swaps,
        invalid = stats.invalid_moves,
        matches = stats.matches,
        destroyed = stats.tiles_destroyed,
        spawned = stats.tiles_spawned,
        largest_match = stats.largest_match,
        "simulation finished"
    );
    println!("{}", engine.grid());
    Ok(())
}
