//! Mineral Rush headless driver
//!
//! Runs one scripted session against a recording surface and prints the
//! session report as JSON.
//!
//! Usage: mineral-rush [levels.json] [level-number] [settings.json]

use std::cell::RefCell;
use std::rc::Rc;

use mineral_rush::assets::AssetRegistry;
use mineral_rush::inventory::BoostInventory;
use mineral_rush::level::default_pool;
use mineral_rush::renderer::CommandList;
use mineral_rush::report::SessionReport;
use mineral_rush::sim::{FrameOutcome, GameEngine, PointerInput, SessionCallbacks};
use mineral_rush::{EngineResult, LevelCatalog, LevelConfig, Settings};

/// ~60 fps
const FRAME_MS: u64 = 16;
/// Simulated player reaction: one tap every N frames
const TAP_EVERY_FRAMES: u64 = 12;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let args: Vec<String> = std::env::args().collect();

    let level = match args.get(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            LevelCatalog::from_json(&json, &default_pool())?.select(args.get(2).map(String::as_str))
        }
        None => LevelConfig::default(),
    };
    let settings = args
        .get(3)
        .map(|path| Settings::load_or_default(path))
        .unwrap_or_default();
    log::info!("Mineral Rush (native) starting level {} '{}'", level.id, level.name);

    // No image backend natively: every visual resolves
    let mut assets = AssetRegistry::new();
    assets.preload(level.visual_ids(), |_| Ok::<(), String>(()));

    let mut inventory = BoostInventory::new(settings.boost_cooldown_ms);
    for id in ["boost1", "boost2", "boost3"] {
        inventory.add(id, 1);
    }

    let ended = Rc::new(RefCell::new(None));
    let callbacks = SessionCallbacks::default()
        .on_time_remaining_changed(|t| log::info!("{} s left", t))
        .on_session_ended({
            let ended = ended.clone();
            move |total, tally| {
                log::info!("Collected {:.1} across {} minerals", total, tally.len());
                *ended.borrow_mut() = Some(total);
            }
        });

    let mut engine = GameEngine::new(CommandList::new(480.0, 800.0), callbacks, Some(level), settings)
        .with_assets(assets);

    let mut now = 0;
    engine.start_game(now);
    let mut frame_index = 0u64;
    loop {
        now += FRAME_MS;
        frame_index += 1;

        // Scripted boosts a few seconds in
        let script = match now {
            3000..3016 => Some("boost3"),
            6000..6016 => Some("boost1"),
            12000..12016 => Some("boost2"),
            _ => None,
        };
        if let Some(id) = script {
            match inventory.try_use(id, now) {
                Ok(_) => {
                    engine.use_boost(id, now)?;
                }
                Err(e) => log::info!("{}", e),
            }
        }

        engine.advance(now);

        // Tap the lowest entity, like a player chasing the closest one
        if frame_index.is_multiple_of(TAP_EVERY_FRAMES) {
            let target = engine
                .session()
                .active
                .iter()
                .filter(|e| e.pos.y >= 0.0)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos + glam::Vec2::splat(e.size / 2.0));
            if let Some(p) = target {
                engine.pointer_down(PointerInput::at(p.x, p.y));
            }
        }

        if engine.frame(now) != FrameOutcome::Continue {
            break;
        }
    }

    let report = SessionReport::from_engine(&engine);
    println!("{}", report.to_json()?);
    if ended.borrow().is_none() {
        log::warn!("Session ended without a result");
    }
    Ok(())
}
