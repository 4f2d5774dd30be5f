//! End-of-session hand-off
//!
//! What the host sends to the backend once `on_session_ended` fires.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::renderer::Surface;
use crate::sim::{GameEngine, Lifecycle, SessionStats, Tally};

/// Session result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub level_id: u32,
    /// Running score at the end
    pub score: f64,
    /// Sum of tally points (the value credited to the player)
    pub total_value: f64,
    pub tally: Tally,
    /// Accepted boost activations by boost id
    pub boosts_used: BTreeMap<String, u32>,
    pub stats: SessionStats,
    /// False if built before the session ended
    pub complete: bool,
}

impl SessionReport {
    pub fn from_engine<S: Surface>(engine: &GameEngine<S>) -> Self {
        let session = engine.session();
        Self {
            level_id: engine.level().id,
            score: session.score,
            total_value: session.tally.total(),
            tally: session.tally.clone(),
            boosts_used: engine
                .boosts()
                .used()
                .iter()
                .map(|(kind, n)| (kind.id().to_owned(), *n))
                .collect(),
            stats: session.stats.clone(),
            complete: session.lifecycle == Lifecycle::Over,
        }
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
