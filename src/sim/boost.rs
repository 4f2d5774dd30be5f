//! Player-triggered boosts
//!
//! - SpeedUp: spawn at half the level interval for a fixed window
//! - Clear: collect everything on the field at once
//! - DoublePoints: global multiplier 2 for a fixed window, never extended

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::scoring::{Collection, ScoringEngine};
use super::state::GameSession;
use super::timer::{Fired, Scheduler, TimerId, TimerKind};
use crate::error::EngineError;
use crate::settings::Settings;

/// Boost types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoostKind {
    SpeedUp,
    Clear,
    DoublePoints,
}

impl BoostKind {
    pub const ALL: [BoostKind; 3] = [BoostKind::SpeedUp, BoostKind::Clear, BoostKind::DoublePoints];

    /// Store/inventory identifier
    pub fn id(&self) -> &'static str {
        match self {
            BoostKind::SpeedUp => "boost1",
            BoostKind::Clear => "boost2",
            BoostKind::DoublePoints => "boost3",
        }
    }
}

impl FromStr for BoostKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boost1" | "speed_up" | "speedup" => Ok(BoostKind::SpeedUp),
            "boost2" | "dynamite" | "clear" => Ok(BoostKind::Clear),
            "boost3" | "double_points" | "doublepoints" => Ok(BoostKind::DoublePoints),
            _ => Err(EngineError::UnknownBoost(s.to_owned())),
        }
    }
}

impl fmt::Display for BoostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of a boost request
#[derive(Debug, Clone, PartialEq)]
pub enum BoostOutcome {
    /// Effect applied
    Applied,
    /// Clear applied, with one entry per collected entity
    Cleared(Vec<Collection>),
    /// DoublePoints already running; window unchanged
    AlreadyActive,
    /// Session not running
    Ignored,
}

/// Timed boost state for one session
#[derive(Debug, Clone)]
pub struct BoostSystem {
    speed_up_expiry: Option<TimerId>,
    double_points_expiry: Option<TimerId>,
    used: BTreeMap<BoostKind, u32>,
    speed_up_window_ms: u64,
    double_points_window_ms: u64,
    double_points_multiplier: f64,
}

impl BoostSystem {
    pub fn new(settings: &Settings) -> Self {
        Self {
            speed_up_expiry: None,
            double_points_expiry: None,
            used: BTreeMap::new(),
            speed_up_window_ms: settings.speed_up_window_ms,
            double_points_window_ms: settings.double_points_window_ms,
            double_points_multiplier: settings.double_points_multiplier,
        }
    }

    pub fn is_speed_up_active(&self) -> bool {
        self.speed_up_expiry.is_some()
    }

    pub fn is_double_points_active(&self) -> bool {
        self.double_points_expiry.is_some()
    }

    /// Accepted activations per kind
    pub fn used(&self) -> &BTreeMap<BoostKind, u32> {
        &self.used
    }

    fn record_use(&mut self, kind: BoostKind) {
        *self.used.entry(kind).or_insert(0) += 1;
    }

    /// Swap the spawn timer for one at half the interval
    ///
    /// A second call inside the window re-arms the fast spawn timer but keeps
    /// the pending expiry: the window still ends 5 s after the first use.
    pub fn speed_up(
        &mut self,
        scheduler: &mut Scheduler,
        spawn_timer: &mut Option<TimerId>,
        base_interval_ms: u64,
        now_ms: u64,
    ) -> BoostOutcome {
        scheduler.cancel_slot(spawn_timer);
        *spawn_timer = Some(scheduler.every(TimerKind::Spawn, now_ms, base_interval_ms / 2));

        if self.speed_up_expiry.is_none() {
            self.speed_up_expiry = Some(scheduler.after(TimerKind::SpeedUpExpiry, now_ms, self.speed_up_window_ms));
        }

        self.record_use(BoostKind::SpeedUp);
        log::info!("SpeedUp active: spawning every {} ms", (base_interval_ms / 2).max(1));
        BoostOutcome::Applied
    }

    /// Restore the configured spawn interval
    pub fn end_speed_up(
        &mut self,
        scheduler: &mut Scheduler,
        spawn_timer: &mut Option<TimerId>,
        base_interval_ms: u64,
        fired: Fired,
    ) {
        if self.speed_up_expiry != Some(fired.id) {
            log::debug!("Ignoring stale SpeedUp expiry {:?}", fired.id);
            return;
        }
        self.speed_up_expiry = None;
        scheduler.cancel_slot(spawn_timer);
        *spawn_timer = Some(scheduler.every(TimerKind::Spawn, fired.at_ms, base_interval_ms));
        log::info!("SpeedUp ended: spawning every {} ms", base_interval_ms);
    }

    /// Collect every active entity through the normal collection path
    ///
    /// `on_collected` runs right after each collection with the new score.
    pub fn clear(
        &mut self,
        scoring: &ScoringEngine,
        session: &mut GameSession,
        mut on_collected: impl FnMut(f64),
    ) -> BoostOutcome {
        let mut collections = Vec::with_capacity(session.active.len());
        for i in 0..session.active.len() {
            if let Some(c) = scoring.collect(session, i) {
                on_collected(session.score);
                collections.push(c);
            }
        }
        session.active.clear();

        self.record_use(BoostKind::Clear);
        log::info!("Clear collected {} entities", collections.len());
        BoostOutcome::Cleared(collections)
    }

    /// Double the global multiplier for the window, unless already active
    pub fn double_points(
        &mut self,
        scheduler: &mut Scheduler,
        session: &mut GameSession,
        now_ms: u64,
    ) -> BoostOutcome {
        if self.is_double_points_active() {
            log::debug!("DoublePoints already active");
            return BoostOutcome::AlreadyActive;
        }
        session.score_multiplier = self.double_points_multiplier;
        self.double_points_expiry = Some(scheduler.after(
            TimerKind::DoublePointsExpiry,
            now_ms,
            self.double_points_window_ms,
        ));

        self.record_use(BoostKind::DoublePoints);
        log::info!("DoublePoints active for {} ms", self.double_points_window_ms);
        BoostOutcome::Applied
    }

    /// Window over: multiplier back to 1
    pub fn end_double_points(&mut self, session: &mut GameSession, fired: Fired) {
        if self.double_points_expiry != Some(fired.id) {
            log::debug!("Ignoring stale DoublePoints expiry {:?}", fired.id);
            return;
        }
        self.double_points_expiry = None;
        session.score_multiplier = 1.0;
        log::info!("DoublePoints ended");
    }

    /// Cancel pending expiries (session end)
    pub fn reset(&mut self, scheduler: &mut Scheduler, session: &mut GameSession) {
        scheduler.cancel_slot(&mut self.speed_up_expiry);
        scheduler.cancel_slot(&mut self.double_points_expiry);
        session.score_multiplier = 1.0;
    }
}
