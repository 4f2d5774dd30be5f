//! Player boost stock
//!
//! The host gate in front of [`GameEngine::use_boost`](crate::sim::GameEngine::use_boost):
//! each boost id has a quantity, a per-id cooldown after every use, and a
//! used count that goes to the backend with the session result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::BOOST_COOLDOWN_MS;
use crate::error::{EngineError, EngineResult};
use crate::sim::BoostKind;

/// Boosts owned by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostInventory {
    /// Remaining quantity per boost id
    pub quantities: BTreeMap<String, u32>,
    /// Uses during the current session
    pub used: BTreeMap<String, u32>,
    pub cooldown_ms: u64,
    /// Host time (ms) at which each id becomes usable again
    #[serde(skip)]
    ready_at: BTreeMap<String, u64>,
}

impl Default for BoostInventory {
    fn default() -> Self {
        Self::new(BOOST_COOLDOWN_MS)
    }
}

impl BoostInventory {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            quantities: BTreeMap::new(),
            used: BTreeMap::new(),
            cooldown_ms,
            ready_at: BTreeMap::new(),
        }
    }

    /// Parse a `{ "boost1": 3, ... }` quantity map
    pub fn from_json(json: &str, cooldown_ms: u64) -> EngineResult<Self> {
        let quantities: BTreeMap<String, u32> = serde_json::from_str(json)?;
        Ok(Self {
            quantities,
            ..Self::new(cooldown_ms)
        })
    }

    pub fn quantity(&self, id: &str) -> u32 {
        self.quantities.get(id).copied().unwrap_or(0)
    }

    pub fn add(&mut self, id: &str, amount: u32) {
        let q = self.quantities.entry(id.to_owned()).or_insert(0);
        *q = q.saturating_add(amount);
    }

    /// Milliseconds until `id` can be used again (None if ready)
    pub fn cooldown_remaining(&self, id: &str, now_ms: u64) -> Option<u64> {
        self.ready_at
            .get(id)
            .filter(|&&ready| ready > now_ms)
            .map(|&ready| ready - now_ms)
    }

    /// Consume one boost and start its cooldown
    pub fn try_use(&mut self, id: &str, now_ms: u64) -> EngineResult<BoostKind> {
        let kind: BoostKind = id.parse()?;

        if let Some(remaining_ms) = self.cooldown_remaining(id, now_ms) {
            log::info!("Boost {} is on cooldown", id);
            return Err(EngineError::BoostOnCooldown {
                id: id.to_owned(),
                remaining_ms,
            });
        }

        match self.quantities.get_mut(id) {
            Some(q) if *q > 0 => *q -= 1,
            _ => {
                log::info!("No boost of type {} available", id);
                return Err(EngineError::BoostUnavailable(id.to_owned()));
            }
        }

        *self.used.entry(id.to_owned()).or_insert(0) += 1;
        self.ready_at.insert(id.to_owned(), now_ms + self.cooldown_ms);
        Ok(kind)
    }

    /// Forget session usage and cooldowns (new session)
    pub fn reset_session(&mut self) {
        self.used.clear();
        self.ready_at.clear();
    }
}
