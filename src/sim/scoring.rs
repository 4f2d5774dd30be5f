//! Point awards and the per-variant tally
//!
//! Awarded points = base payout x global multiplier x combo x level, where
//! the combo counts entities still in the active collection that are already
//! flagged collected when this one is taken. That only happens inside a
//! single step (the Clear boost); a lone tap always sees a combo of 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::GameSession;
use crate::consts::COMBO_BONUS;
use crate::level_multiplier;

/// Aggregate for one visual id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub count: u32,
    /// Base payout of the variant
    pub unit_value: f64,
    /// Points awarded for this variant, all multipliers included
    pub accumulated_points: f64,
}

/// Per-variant collection summary (append/update only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally {
    entries: BTreeMap<String, TallyEntry>,
}

impl Tally {
    pub fn record(&mut self, visual_id: &str, unit_value: f64, points: f64) {
        let entry = self
            .entries
            .entry(visual_id.to_owned())
            .or_insert_with(|| TallyEntry {
                count: 0,
                unit_value,
                accumulated_points: 0.0,
            });
        entry.count += 1;
        entry.accumulated_points += points;
    }

    pub fn get(&self, visual_id: &str) -> Option<&TallyEntry> {
        self.entries.get(visual_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TallyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Session total: sum of accumulated points
    pub fn total(&self) -> f64 {
        self.entries.values().map(|e| e.accumulated_points).sum()
    }

    /// Total entities collected
    pub fn count(&self) -> u32 {
        self.entries.values().map(|e| e.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single collection result
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub entity_id: u32,
    pub visual_id: String,
    pub points: f64,
}

/// Multiplier composition for one session
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    level_multiplier: f64,
}

impl ScoringEngine {
    pub fn new(level_id: u32) -> Self {
        Self {
            level_multiplier: level_multiplier(level_id),
        }
    }

    pub fn level_multiplier(&self) -> f64 {
        self.level_multiplier
    }

    #[inline]
    pub fn combo_multiplier(collected_siblings: usize) -> f64 {
        1.0 + collected_siblings as f64 * COMBO_BONUS
    }

    /// Points for one collection
    pub fn award(&self, payout: f64, global: f64, collected_siblings: usize) -> f64 {
        payout * global * Self::combo_multiplier(collected_siblings) * self.level_multiplier
    }

    /// Collect the active entity at `index`
    ///
    /// Flags it, scores it, and updates the tally and score. The caller
    /// removes it from the active collection. None if it was already taken.
    pub fn collect(&self, session: &mut GameSession, index: usize) -> Option<Collection> {
        let siblings = session.active.iter().filter(|e| e.collected).count();
        let global = session.score_multiplier;

        let entity = session.active.get_mut(index)?;
        if !entity.collect() {
            return None;
        }

        let points = self.award(entity.payout, global, siblings);
        session.tally.record(&entity.visual_id, entity.payout, points);
        session.score += points;
        session.stats.collected += 1;

        Some(Collection {
            entity_id: entity.id,
            visual_id: entity.visual_id.clone(),
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::CollectibleTemplate;
    use crate::sim::entity::Entity;
    use glam::Vec2;

    fn session_with(payouts: &[f64]) -> GameSession {
        let mut session = GameSession::new(20);
        for (i, &p) in payouts.iter().enumerate() {
            let t = CollectibleTemplate::new(format!("M{i}"), format!("/m/{i}.png"), p);
            session.active.push(Entity::new(i as u32, &t, Vec2::ZERO, 100.0, 50.0));
        }
        session
    }

    #[test]
    fn test_level_two_single_collection() {
        let scoring = ScoringEngine::new(2);
        let mut session = session_with(&[10.0]);
        let c = scoring.collect(&mut session, 0).unwrap();
        assert_eq!(c.points, 12.0);
        assert_eq!(session.score, 12.0);
    }

    #[test]
    fn test_global_and_combo_compose() {
        let scoring = ScoringEngine::new(0);
        assert!((scoring.award(5.0, 2.0, 3) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_combo_counts_flagged_siblings() {
        let scoring = ScoringEngine::new(0);
        let mut session = session_with(&[10.0, 10.0, 10.0]);
        let points: Vec<f64> = (0..3)
            .map(|i| scoring.collect(&mut session, i).unwrap().points)
            .collect();
        assert!((points[0] - 10.0).abs() < 1e-9);
        assert!((points[1] - 11.0).abs() < 1e-9);
        assert!((points[2] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_collect_rejected() {
        let scoring = ScoringEngine::new(0);
        let mut session = session_with(&[4.0]);
        assert!(scoring.collect(&mut session, 0).is_some());
        assert!(scoring.collect(&mut session, 0).is_none());
        assert!(scoring.collect(&mut session, 7).is_none());
        assert_eq!(session.score, 4.0);
    }

    #[test]
    fn test_tally_entry_keeps_unit_value() {
        let mut tally = Tally::default();
        tally.record("/m/Fe.png", 3.0, 3.3);
        tally.record("/m/Fe.png", 3.0, 6.6);
        tally.record("/m/Cu.png", 8.0, 8.0);
        let fe = tally.get("/m/Fe.png").unwrap();
        assert_eq!(fe.count, 2);
        assert_eq!(fe.unit_value, 3.0);
        assert!((fe.accumulated_points - 9.9).abs() < 1e-9);
        assert!((tally.total() - 17.9).abs() < 1e-9);
        assert_eq!(tally.count(), 3);
    }
}
