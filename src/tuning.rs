//! Data-driven level catalog
//!
//! Levels are index addressed and read-only once loaded. The JSON form uses the
//! same camelCase field names as the hand-edited level files, so a catalog can
//! be swapped without rebuilding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hurt flash duration after a non-lethal hit (ms)
pub const DEFAULT_HIT_FLASH_MS: f64 = 100.0;

fn default_speed_multiplier() -> f32 {
    1.0
}
fn default_teleport_base() -> f64 {
    0.002
}
fn default_teleport_aggression() -> f64 {
    0.02
}
fn default_last_phase() -> f32 {
    0.3
}

/// Tuning for a single level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    /// Time budget in seconds
    pub time_seconds: f64,
    #[serde(default = "default_speed_multiplier")]
    pub base_speed_multiplier: f32,
    /// Per-frame teleport probability at zero aggression
    #[serde(default = "default_teleport_base")]
    pub teleport_chance_base: f64,
    /// Added teleport probability at full aggression
    #[serde(default = "default_teleport_aggression")]
    pub teleport_chance_aggression: f64,
    /// Trailing fraction of the time budget during which the target grows
    #[serde(default = "default_last_phase")]
    pub last_phase_percent: f32,
    /// Hit points (boss levels only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    /// Hurt flash duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_flash_ms: Option<f64>,
    /// Hidden until unlocked
    #[serde(default)]
    pub secret: bool,
}

impl LevelConfig {
    /// Hit points a fresh target starts with (never below 1)
    pub fn hit_points(&self) -> u32 {
        self.health.unwrap_or(1).max(1)
    }

    /// Boss levels take more than one hit and evade when struck
    pub fn is_boss(&self) -> bool {
        self.health.is_some_and(|hp| hp > 1)
    }

    pub fn hit_flash_ms(&self) -> f64 {
        self.hit_flash_ms.unwrap_or(DEFAULT_HIT_FLASH_MS)
    }

    /// Label used by the level list (`"1. Level 1 — Easy — 60s"`)
    pub fn list_label(&self, index: usize) -> String {
        format!("{}. {} — {}s", index + 1, self.name, self.time_seconds)
    }

    fn validate(&self, index: usize) -> Result<(), CatalogError> {
        if !self.time_seconds.is_finite() || self.time_seconds <= 0.0 {
            return Err(CatalogError::InvalidTime {
                index,
                value: self.time_seconds,
            });
        }
        for (field, value) in [
            ("teleportChanceBase", self.teleport_chance_base),
            ("teleportChanceAggression", self.teleport_chance_aggression),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CatalogError::InvalidProbability {
                    index,
                    field,
                    value,
                });
            }
        }
        if !(self.last_phase_percent > 0.0 && self.last_phase_percent <= 1.0) {
            return Err(CatalogError::InvalidLastPhase {
                index,
                value: self.last_phase_percent,
            });
        }
        if !self.base_speed_multiplier.is_finite() || self.base_speed_multiplier < 0.0 {
            return Err(CatalogError::InvalidSpeed {
                index,
                value: self.base_speed_multiplier,
            });
        }
        Ok(())
    }
}

/// Problems found while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("level catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level catalog is empty")]
    Empty,
    #[error("level {index}: time budget must be a positive number of seconds, got {value}")]
    InvalidTime { index: usize, value: f64 },
    #[error("level {index}: {field} must be within [0, 1], got {value}")]
    InvalidProbability {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("level {index}: lastPhasePercent must be within (0, 1], got {value}")]
    InvalidLastPhase { index: usize, value: f32 },
    #[error("level {index}: baseSpeedMultiplier must be non-negative, got {value}")]
    InvalidSpeed { index: usize, value: f32 },
}

/// Ordered, read-only list of levels
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Build a catalog, rejecting empty lists and nonsensical tuning
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            level.validate(index)?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of level records
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        let catalog = Self::new(levels)?;
        log::info!("Loaded level catalog ({} levels)", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }

    /// Clamp an index into the catalog range
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.levels.len().saturating_sub(1))
    }

    /// Levels shown in the level list, with secret levels hidden until unlocked
    pub fn listing(&self, secret_unlocked: bool) -> Vec<(usize, String)> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| secret_unlocked || !level.secret)
            .map(|(i, level)| (i, level.list_label(i)))
            .collect()
    }

    /// True if clearing `index` should unlock the secret levels
    pub fn unlocks_secret(&self, index: usize) -> bool {
        self.levels
            .iter()
            .rposition(|level| !level.secret)
            .is_some_and(|last_regular| last_regular == index)
            && self.levels.iter().any(|level| level.secret)
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self {
            levels: builtin_levels(),
        }
    }
}

fn level(
    id: u32,
    name: &str,
    time_seconds: f64,
    base_speed_multiplier: f32,
    teleport_chance_base: f64,
    teleport_chance_aggression: f64,
    last_phase_percent: f32,
) -> LevelConfig {
    LevelConfig {
        id,
        name: name.to_string(),
        time_seconds,
        base_speed_multiplier,
        teleport_chance_base,
        teleport_chance_aggression,
        last_phase_percent,
        health: None,
        hit_flash_ms: None,
        secret: false,
    }
}

/// Progressive difficulty: faster, jumpier, longer
fn builtin_levels() -> Vec<LevelConfig> {
    vec![
        level(1, "Level 1 — Easy", 60.0, 0.9, 0.0015, 0.012, 0.35),
        level(2, "Level 2 — Normal", 75.0, 1.1, 0.0025, 0.018, 0.32),
        level(3, "Level 3 — Hard", 90.0, 1.4, 0.0035, 0.025, 0.30),
        level(4, "Level 4 — Very Hard", 105.0, 1.8, 0.0045, 0.035, 0.28),
        level(5, "Level 5 — Insane", 120.0, 2.4, 0.006, 0.05, 0.25),
        LevelConfig {
            health: Some(5),
            hit_flash_ms: Some(120.0),
            secret: true,
            ..level(6, "Secret — Boss John", 90.0, 1.6, 0.004, 0.03, 0.3)
        },
    ]
}
