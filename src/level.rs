//! Level configuration
//!
//! Hosts ship collectible records in a loose shape: the visual can live under
//! `image` or `src` and is not always a string, and level pools may name
//! minerals by symbol only. Everything is normalized here, once, into
//! [`CollectibleTemplate`] so the spawner never inspects raw records.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, EngineResult};

/// A spawnable collectible variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TemplateRecord")]
pub struct CollectibleTemplate {
    /// Element symbol (catalogue key)
    pub symbol: String,
    /// Visual reference; empty when the record had none
    pub visual_id: String,
    /// Base point value (never negative)
    pub payout: f64,
}

impl CollectibleTemplate {
    pub fn new(symbol: impl Into<String>, visual_id: impl Into<String>, payout: f64) -> Self {
        Self {
            symbol: symbol.into(),
            visual_id: visual_id.into(),
            payout: sanitize_payout(payout),
        }
    }
}

/// Clamp a payout to a finite, non-negative value
pub(crate) fn sanitize_payout(payout: f64) -> f64 {
    if payout.is_finite() { payout.max(0.0) } else { 0.0 }
}

/// Serialized template shape; deserializing goes through [`CollectibleTemplate::new`]
#[derive(Deserialize)]
struct TemplateRecord {
    symbol: String,
    #[serde(default)]
    visual_id: String,
    #[serde(default)]
    payout: f64,
}

impl From<TemplateRecord> for CollectibleTemplate {
    fn from(r: TemplateRecord) -> Self {
        Self::new(r.symbol, r.visual_id, r.payout)
    }
}

/// Collectible record as shipped by the host
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollectible {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub image: Option<serde_json::Value>,
    #[serde(default)]
    pub src: Option<serde_json::Value>,
    #[serde(default, alias = "payout")]
    pub points: Option<f64>,
}

impl RawCollectible {
    /// Resolve the visual field and clamp the payout
    pub fn normalize(&self) -> CollectibleTemplate {
        let as_str = |v: &Option<serde_json::Value>| {
            v.as_ref().and_then(|v| v.as_str()).map(str::to_owned)
        };
        let visual_id = as_str(&self.image).or_else(|| as_str(&self.src)).unwrap_or_default();
        let symbol = self.symbol.clone().unwrap_or_else(|| visual_id.clone());
        CollectibleTemplate::new(symbol, visual_id, self.points.unwrap_or(0.0))
    }
}

/// Level pool entry: a catalogue symbol or an inline record
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PoolEntry {
    Symbol(String),
    Record(RawCollectible),
}

/// Level record as shipped by the host
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLevel {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub background: String,
    pub minerals: Vec<PoolEntry>,
    pub spawn_interval: u64,
    pub min_speed: f32,
    pub max_speed: f32,
    pub duration: u32,
}

/// Built-in collectible pool used without a level
pub fn default_pool() -> Vec<CollectibleTemplate> {
    vec![
        CollectibleTemplate::new("H", "/minerals/H.png", 1.0),
        CollectibleTemplate::new("He", "/minerals/He.png", 2.0),
        CollectibleTemplate::new("Li", "/minerals/Li.png", 3.0),
        CollectibleTemplate::new("Be", "/minerals/Be.png", 4.0),
    ]
}

/// Read-only level parameters for one session
#[derive(Debug, Clone, Serialize)]
pub struct LevelConfig {
    /// Numeric level id (0 = built-in defaults)
    pub id: u32,
    pub name: String,
    pub background: String,
    /// Ordered collectible pool
    pub pool: Vec<CollectibleTemplate>,
    pub spawn_interval_ms: u64,
    pub min_speed: f32,
    pub max_speed: f32,
    pub duration_secs: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: "Default".into(),
            background: "#000".into(),
            pool: default_pool(),
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl LevelConfig {
    /// Normalize a raw level against a mineral catalogue
    ///
    /// Unknown symbols fall back to the catalogue's first entry, or the
    /// first built-in mineral if the catalogue is empty.
    pub fn from_raw(raw: RawLevel, catalogue: &[CollectibleTemplate]) -> EngineResult<Self> {
        let fallback = catalogue
            .first()
            .cloned()
            .unwrap_or_else(|| default_pool().remove(0));

        let pool = raw
            .minerals
            .iter()
            .map(|entry| match entry {
                PoolEntry::Symbol(symbol) => catalogue
                    .iter()
                    .find(|m| &m.symbol == symbol)
                    .cloned()
                    .unwrap_or_else(|| {
                        log::warn!("Level {}: unknown mineral {}, using {}", raw.id, symbol, fallback.symbol);
                        fallback.clone()
                    }),
                PoolEntry::Record(record) => record.normalize(),
            })
            .collect();

        let level = Self {
            id: raw.id,
            name: raw.name,
            background: raw.background,
            pool,
            spawn_interval_ms: raw.spawn_interval,
            min_speed: raw.min_speed,
            max_speed: raw.max_speed,
            duration_secs: raw.duration,
        };
        level.validate()?;
        Ok(level)
    }

    /// Parse a single level
    pub fn from_json(json: &str, catalogue: &[CollectibleTemplate]) -> EngineResult<Self> {
        let raw: RawLevel = serde_json::from_str(json)?;
        Self::from_raw(raw, catalogue)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.spawn_interval_ms == 0 {
            return Err(EngineError::InvalidLevel(format!("level {}: spawn interval is zero", self.id)));
        }
        if self.duration_secs == 0 {
            return Err(EngineError::InvalidLevel(format!("level {}: duration is zero", self.id)));
        }
        let speed_ok = |s: f32| s.is_finite() && s >= 0.0;
        if !speed_ok(self.min_speed) || !speed_ok(self.max_speed) {
            return Err(EngineError::InvalidLevel(format!(
                "level {}: bad speed bounds {}..{}",
                self.id, self.min_speed, self.max_speed
            )));
        }
        if let Some(bad) = self.pool.iter().find(|m| !(m.payout.is_finite() && m.payout >= 0.0)) {
            return Err(EngineError::InvalidLevel(format!(
                "level {}: mineral {} has payout {}",
                self.id, bad.symbol, bad.payout
            )));
        }
        if self.pool.is_empty() {
            log::warn!("Level {} has an empty pool, nothing will spawn", self.id);
        }
        Ok(())
    }

    /// Every distinct visual this level can spawn
    pub fn visual_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .pool
            .iter()
            .map(|m| m.visual_id.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Ordered set of levels
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    pub levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Parse a JSON array of levels
    pub fn from_json(json: &str, catalogue: &[CollectibleTemplate]) -> EngineResult<Self> {
        let raw: Vec<RawLevel> = serde_json::from_str(json)?;
        let levels = raw
            .into_iter()
            .map(|r| LevelConfig::from_raw(r, catalogue))
            .collect::<EngineResult<Vec<_>>>()?;
        log::info!("Loaded {} levels", levels.len());
        Ok(Self { levels })
    }

    /// Pick a level from a 1-based query parameter
    ///
    /// Missing, unparsable or out-of-range values select the first level.
    pub fn select(&self, param: Option<&str>) -> LevelConfig {
        let index = param
            .and_then(|p| p.trim().parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .filter(|&i| i < self.levels.len())
            .unwrap_or(0);
        self.levels.get(index).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<CollectibleTemplate> {
        vec![
            CollectibleTemplate::new("Na", "/m/Na.png", 5.0),
            CollectibleTemplate::new("K", "/m/K.png", 7.0),
        ]
    }

    #[test]
    fn test_visual_prefers_image_then_src() {
        let raw: RawCollectible =
            serde_json::from_str(r#"{ "symbol": "Fe", "image": "/a.png", "src": "/b.png", "points": 3 }"#).unwrap();
        assert_eq!(raw.normalize().visual_id, "/a.png");

        let raw: RawCollectible =
            serde_json::from_str(r#"{ "symbol": "Fe", "image": { "w": 1 }, "src": "/b.png", "points": 3 }"#).unwrap();
        assert_eq!(raw.normalize().visual_id, "/b.png");

        let raw: RawCollectible = serde_json::from_str(r#"{ "symbol": "Fe", "src": 12 }"#).unwrap();
        let t = raw.normalize();
        assert_eq!(t.visual_id, "");
        assert_eq!(t.payout, 0.0);
    }

    #[test]
    fn test_negative_payout_clamped() {
        let t = CollectibleTemplate::new("X", "", -4.0);
        assert_eq!(t.payout, 0.0);
    }

    #[test]
    fn test_level_symbols_resolve_against_catalogue() {
        let json = r##"{
            "id": 2, "name": "Alkali", "background": "#1a1a2e",
            "minerals": ["K", "Unobtainium", { "symbol": "Cs", "src": "/m/Cs.png", "points": 9 }],
            "spawnInterval": 180, "minSpeed": 120, "maxSpeed": 420, "duration": 22
        }"##;
        let level = LevelConfig::from_json(json, &catalogue()).unwrap();
        let symbols: Vec<_> = level.pool.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, ["K", "Na", "Cs"]);
        assert_eq!(level.spawn_interval_ms, 180);
        assert_eq!(level.background, "#1a1a2e");
        assert_eq!(level.pool[2].payout, 9.0);
    }

    #[test]
    fn test_catalogue_payouts_clamped_on_load() {
        let catalogue: Vec<CollectibleTemplate> = serde_json::from_str(
            r#"[{ "symbol": "X", "visual_id": "/x.png", "payout": -1.0 }, { "symbol": "Y", "payout": 2.5 }]"#,
        )
        .unwrap();
        assert_eq!(catalogue[0].payout, 0.0);
        assert_eq!(catalogue[1].payout, 2.5);
        assert_eq!(catalogue[1].visual_id, "");

        let json = r#"{ "id": 1, "minerals": ["X"], "spawnInterval": 200, "minSpeed": 100, "maxSpeed": 400, "duration": 20 }"#;
        let level = LevelConfig::from_json(json, &catalogue).unwrap();
        assert_eq!(level.pool[0].payout, 0.0);
    }

    #[test]
    fn test_negative_pool_payout_rejected() {
        let mut level = LevelConfig::default();
        level.pool[0].payout = -1.0;
        assert!(matches!(level.validate(), Err(EngineError::InvalidLevel(_))));
        level.pool[0].payout = f64::NAN;
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let json = r#"{ "id": 1, "minerals": [], "spawnInterval": 0, "minSpeed": 1, "maxSpeed": 2, "duration": 5 }"#;
        let err = LevelConfig::from_json(json, &catalogue()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLevel(_)));
    }

    #[test]
    fn test_catalog_select_falls_back_to_first() {
        let json = r#"[
            { "id": 1, "minerals": ["Na"], "spawnInterval": 200, "minSpeed": 100, "maxSpeed": 400, "duration": 20 },
            { "id": 2, "minerals": ["K"], "spawnInterval": 180, "minSpeed": 120, "maxSpeed": 420, "duration": 22 }
        ]"#;
        let catalog = LevelCatalog::from_json(json, &catalogue()).unwrap();
        assert_eq!(catalog.select(Some("2")).id, 2);
        assert_eq!(catalog.select(Some("0")).id, 1);
        assert_eq!(catalog.select(Some("9")).id, 1);
        assert_eq!(catalog.select(Some("abc")).id, 1);
        assert_eq!(catalog.select(None).id, 1);
        assert_eq!(LevelCatalog::default().select(Some("1")).id, 0);
    }

    #[test]
    fn test_visual_ids_dedup() {
        let mut level = LevelConfig::default();
        level.pool.push(CollectibleTemplate::new("H2", "/minerals/H.png", 1.0));
        level.pool.push(CollectibleTemplate::new("??", "", 1.0));
        assert_eq!(level.visual_ids().len(), 4);
    }
}
