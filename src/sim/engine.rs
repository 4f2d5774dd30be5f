//! Session orchestration
//!
//! The engine owns the session and its event sources:
//! - spawn interval (level spawn interval, halved during SpeedUp)
//! - 1 s countdown interval
//! - boost expiry one-shots
//! - the host's animation frames
//!
//! The host calls [`GameEngine::advance`] to fire due timers and
//! [`GameEngine::frame`] once per animation frame ([`GameEngine::pump`]
//! does both). Either order works: the countdown only lowers
//! `time_remaining`, and the frame step is what finalizes termination.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::boost::{BoostKind, BoostOutcome, BoostSystem};
use super::scoring::{Collection, ScoringEngine, Tally};
use super::spawner::EntitySpawner;
use super::state::{GameSession, Lifecycle, RngState};
use super::timer::{Fired, Scheduler, TimerId, TimerKind};
use crate::assets::AssetRegistry;
use crate::error::EngineResult;
use crate::level::LevelConfig;
use crate::renderer::{DrawEntity, Surface};
use crate::settings::Settings;

type ScoreFn = Box<dyn FnMut(f64)>;
type TimeFn = Box<dyn FnMut(i32)>;
type EndedFn = Box<dyn FnMut(f64, &Tally)>;

/// Observer callbacks for the host UI
#[derive(Default)]
pub struct SessionCallbacks {
    on_score_changed: Option<ScoreFn>,
    on_time_remaining_changed: Option<TimeFn>,
    on_session_ended: Option<EndedFn>,
}

impl SessionCallbacks {
    /// Fires after every collection with the new score
    pub fn on_score_changed(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_score_changed = Some(Box::new(f));
        self
    }

    /// Fires on every countdown tick
    pub fn on_time_remaining_changed(mut self, f: impl FnMut(i32) + 'static) -> Self {
        self.on_time_remaining_changed = Some(Box::new(f));
        self
    }

    /// Fires exactly once, with (total collected value, tally)
    pub fn on_session_ended(mut self, f: impl FnMut(f64, &Tally) + 'static) -> Self {
        self.on_session_ended = Some(Box::new(f));
        self
    }

    fn score_changed(&mut self, score: f64) {
        if let Some(f) = self.on_score_changed.as_mut() {
            f(score);
        }
    }

    fn time_remaining_changed(&mut self, secs: i32) {
        if let Some(f) = self.on_time_remaining_changed.as_mut() {
            f(secs);
        }
    }

    fn session_ended(&mut self, total: f64, tally: &Tally) {
        if let Some(f) = self.on_session_ended.as_mut() {
            f(total, tally);
        }
    }
}

/// Raw pointer-down event
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    /// Pointer position in screen (CSS) pixels
    pub screen: Vec2,
    /// Surface top-left in screen pixels
    pub origin: Vec2,
    /// Device pixels per screen pixel
    pub scale: Vec2,
}

impl PointerInput {
    /// Pointer at surface-relative coordinates, 1:1 scale
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            screen: Vec2::new(x, y),
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    /// Scale from surface device size over its displayed size
    pub fn with_display(mut self, origin: Vec2, displayed: Vec2, device: Vec2) -> Self {
        self.origin = origin;
        self.scale = if displayed.x > 0.0 && displayed.y > 0.0 {
            device / displayed
        } else {
            Vec2::ONE
        };
        self
    }

    /// Field-space position
    #[inline]
    pub fn to_field(&self) -> Vec2 {
        (self.screen - self.origin) * self.scale
    }
}

/// Result of a frame step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Schedule another frame
    Continue,
    /// Session ended on this frame
    Ended,
    /// Not running (idle or already over)
    Inactive,
}

/// Handles of the session's periodic timers
#[derive(Debug, Clone, Default)]
struct SessionTimers {
    spawn: Option<TimerId>,
    countdown: Option<TimerId>,
}

/// The real-time engine for one session
pub struct GameEngine<S: Surface> {
    level: LevelConfig,
    settings: Settings,
    session: GameSession,
    scheduler: Scheduler,
    timers: SessionTimers,
    spawner: EntitySpawner,
    scoring: ScoringEngine,
    boosts: BoostSystem,
    rng: Pcg32,
    surface: S,
    assets: Option<AssetRegistry>,
    callbacks: SessionCallbacks,
    last_frame_ms: u64,
}

impl<S: Surface> GameEngine<S> {
    /// Create an idle engine; `None` uses the built-in level
    pub fn new(
        surface: S,
        callbacks: SessionCallbacks,
        level: Option<LevelConfig>,
        settings: Settings,
    ) -> Self {
        let level = level.unwrap_or_default();
        Self {
            session: GameSession::new(level.duration_secs),
            scheduler: Scheduler::new(),
            timers: SessionTimers::default(),
            spawner: EntitySpawner::new(&level, settings.entity_size),
            scoring: ScoringEngine::new(level.id),
            boosts: BoostSystem::new(&settings),
            rng: RngState::new(settings.seed).to_rng(),
            surface,
            assets: None,
            callbacks,
            last_frame_ms: 0,
            level,
            settings,
        }
    }

    /// Attach preloaded visuals (draws of failed visuals are flagged)
    pub fn with_assets(mut self, assets: AssetRegistry) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lifecycle
    }

    pub fn score(&self) -> f64 {
        self.session.score
    }

    pub fn time_remaining(&self) -> i32 {
        self.session.time_remaining
    }

    pub fn boosts(&self) -> &BoostSystem {
        &self.boosts
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of armed timers (spawn, countdown, boost expiries)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Current spawn period, if spawning is armed
    pub fn spawn_interval_ms(&self) -> Option<u64> {
        self.timers.spawn.and_then(|id| self.scheduler.period_of(id))
    }

    /// Start the session (only from Idle)
    pub fn start_game(&mut self, now_ms: u64) -> bool {
        if self.session.lifecycle != Lifecycle::Idle {
            log::debug!("start_game ignored in {:?}", self.session.lifecycle);
            return false;
        }

        self.session.lifecycle = Lifecycle::Running;
        self.session.started_at_ms = Some(now_ms);
        self.last_frame_ms = now_ms;

        self.timers.spawn = Some(self.scheduler.every(
            TimerKind::Spawn,
            now_ms,
            self.level.spawn_interval_ms,
        ));
        self.timers.countdown = Some(self.scheduler.every(
            TimerKind::Countdown,
            now_ms,
            self.settings.countdown_period_ms,
        ));

        log::info!(
            "Level {} started: {} s, spawn every {} ms, {} variants",
            self.level.id,
            self.session.time_remaining,
            self.level.spawn_interval_ms,
            self.spawner.pool().len()
        );
        self.render();
        true
    }

    /// Fire every timer due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64) {
        while self.session.is_running() {
            let Some(fired) = self.scheduler.pop_due(now_ms) else {
                break;
            };
            self.dispatch(fired);
        }
    }

    /// Advance timers, then step a frame
    pub fn pump(&mut self, now_ms: u64) -> FrameOutcome {
        self.advance(now_ms);
        self.frame(now_ms)
    }

    fn dispatch(&mut self, fired: Fired) {
        match fired.kind {
            TimerKind::Spawn => self.on_spawn_tick(fired),
            TimerKind::Countdown => self.on_countdown_tick(fired),
            TimerKind::SpeedUpExpiry => {
                self.boosts.end_speed_up(
                    &mut self.scheduler,
                    &mut self.timers.spawn,
                    self.level.spawn_interval_ms,
                    fired,
                );
                self.disarm_spawn_if_out_of_time();
            }
            TimerKind::DoublePointsExpiry => self.boosts.end_double_points(&mut self.session, fired),
        }
    }

    /// Spawning stops for good once the countdown hits zero
    fn disarm_spawn_if_out_of_time(&mut self) {
        if self.session.time_remaining <= 0 {
            self.scheduler.cancel_slot(&mut self.timers.spawn);
        }
    }

    fn on_spawn_tick(&mut self, fired: Fired) {
        if self.timers.spawn != Some(fired.id) {
            return;
        }
        if self.session.time_remaining <= 0 {
            self.disarm_spawn_if_out_of_time();
            return;
        }
        if self.spawner.probabilities().is_empty() {
            self.session.stats.skipped_spawns += 1;
            log::debug!("Spawn skipped: empty pool");
            return;
        }

        let field = self.surface.size();
        let height_scale = self.settings.height_scale(field.y);
        let id = self.session.next_entity_id();
        if let Some(entity) = self.spawner.spawn(
            &mut self.rng,
            id,
            field,
            self.session.time_remaining,
            height_scale,
        ) {
            log::debug!("Spawned {} '{}' at x={:.0} v={:.0}", entity.id, entity.visual_id, entity.pos.x, entity.velocity);
            self.session.active.push(entity);
            self.session.stats.spawned += 1;
        }
    }

    fn on_countdown_tick(&mut self, fired: Fired) {
        if self.timers.countdown != Some(fired.id) {
            return;
        }
        self.session.time_remaining -= 1;
        self.callbacks.time_remaining_changed(self.session.time_remaining);

        if self.session.time_remaining <= 0 {
            // The next frame finalizes the session
            self.scheduler.cancel_slot(&mut self.timers.countdown);
            self.scheduler.cancel_slot(&mut self.timers.spawn);
            log::info!("Countdown finished");
        }
    }

    /// One animation frame: move, drop misses, draw, check for the end
    pub fn frame(&mut self, now_ms: u64) -> FrameOutcome {
        if !self.session.is_running() {
            return FrameOutcome::Inactive;
        }

        let dt = now_ms.saturating_sub(self.last_frame_ms) as f32 / 1000.0;
        self.last_frame_ms = self.last_frame_ms.max(now_ms);

        for entity in &mut self.session.active {
            entity.update(dt);
        }

        let field_height = self.surface.size().y;
        let before = self.session.active.len();
        self.session.active.retain(|e| !e.is_off_screen(field_height));
        self.session.stats.missed += (before - self.session.active.len()) as u32;

        self.render();

        if self.session.time_remaining <= 0 {
            self.finish();
            FrameOutcome::Ended
        } else {
            FrameOutcome::Continue
        }
    }

    fn render(&mut self) {
        self.surface.clear();
        for entity in &self.session.active {
            let resolved = self
                .assets
                .as_ref()
                .map(|a| a.is_resolved(&entity.visual_id))
                .unwrap_or(true);
            self.surface.draw_entity(&DrawEntity {
                visual_id: entity.visual_id.clone(),
                pos: entity.pos,
                size: entity.size,
                resolved,
            });
        }
    }

    /// Collect the topmost entity under the pointer, if any
    pub fn pointer_down(&mut self, input: PointerInput) -> Option<Collection> {
        if !self.session.is_running() {
            return None;
        }
        let point = input.to_field();
        let index = self.session.topmost_at(point)?;
        let collection = self.scoring.collect(&mut self.session, index)?;
        self.session.active.remove(index);
        self.callbacks.score_changed(self.session.score);
        Some(collection)
    }

    /// Apply a boost by id
    ///
    /// Unknown ids are an error and change nothing. Boosts outside a
    /// running session are ignored.
    pub fn use_boost(&mut self, boost_id: &str, now_ms: u64) -> EngineResult<BoostOutcome> {
        let kind: BoostKind = boost_id.parse().inspect_err(|_| {
            log::warn!("Unknown boost ID: {}", boost_id);
        })?;

        self.advance(now_ms);
        if !self.session.is_running() {
            log::debug!("Boost {} ignored in {:?}", kind, self.session.lifecycle);
            return Ok(BoostOutcome::Ignored);
        }

        let outcome = match kind {
            BoostKind::SpeedUp => {
                let outcome = self.boosts.speed_up(
                    &mut self.scheduler,
                    &mut self.timers.spawn,
                    self.level.spawn_interval_ms,
                    now_ms,
                );
                self.disarm_spawn_if_out_of_time();
                outcome
            }
            BoostKind::Clear => {
                let callbacks = &mut self.callbacks;
                self.boosts
                    .clear(&self.scoring, &mut self.session, |score| callbacks.score_changed(score))
            }
            BoostKind::DoublePoints => {
                self.boosts
                    .double_points(&mut self.scheduler, &mut self.session, now_ms)
            }
        };
        Ok(outcome)
    }

    /// Stop the session now
    ///
    /// A running session ends exactly as if the countdown had run out. An
    /// idle one becomes Over without notifying.
    pub fn end_game(&mut self) {
        match self.session.lifecycle {
            Lifecycle::Running => {
                self.finish();
            }
            Lifecycle::Idle => {
                self.session.lifecycle = Lifecycle::Over;
            }
            Lifecycle::Over => {}
        }
    }

    /// Enter Over: cancel every timer and notify once
    fn finish(&mut self) -> bool {
        if self.session.lifecycle == Lifecycle::Over {
            return false;
        }
        self.session.lifecycle = Lifecycle::Over;

        self.boosts.reset(&mut self.scheduler, &mut self.session);
        self.scheduler.cancel_all();
        self.timers = SessionTimers::default();

        let total = self.session.tally.total();
        log::info!(
            "Session over: score {:.1}, total {:.1}, {} collected, {} missed",
            self.session.score,
            total,
            self.session.stats.collected,
            self.session.stats.missed
        );
        self.callbacks.session_ended(total, &self.session.tally);
        true
    }
}
