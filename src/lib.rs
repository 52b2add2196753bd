//! John Chase - catch the fleeing target before the clock runs out
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (target motion, hit testing, level lifecycle)
//! - `renderer`: 2D drawing surface abstraction and scene painting
//! - `platform`: Browser/native platform abstraction (coordinates, frame scheduling)
//! - `settings`: Persisted weapon choice and secret unlock flag
//! - `tuning`: Data-driven level catalog
//! - `weapons`: Weapon catalog and selection store
//! - `assets`: Image readiness lookup for the renderer
//! - `ui`: Text sinks for the HUD

pub mod assets;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;
pub mod weapons;

pub use settings::Settings;
pub use sim::{Game, GamePhase, LevelEvent};
pub use tuning::{LevelCatalog, LevelConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Smallest target radius in canvas pixels
    pub const MIN_TARGET_RADIUS: f32 = 28.0;
    /// Target radius as a fraction of the smaller canvas dimension
    pub const TARGET_RADIUS_FRACTION: f32 = 0.035;

    /// Slowest base flee speed (pixels/s)
    pub const MIN_BASE_SPEED: f32 = 60.0;
    /// Base flee speed as a fraction of the smaller canvas dimension (per second)
    pub const BASE_SPEED_FRACTION: f32 = 0.07;
    /// Extra speed at full aggression (multiplicative on top of 1.0)
    pub const AGGRESSION_SPEED_BOOST: f32 = 1.8;

    /// Below this pointer distance the target does not move
    pub const FLEE_DEAD_ZONE: f32 = 0.1;

    /// Teleport keeps at least this many pixels from each edge
    pub const MIN_TELEPORT_MARGIN: f32 = 60.0;
    /// Teleport margin as a fraction of the axis length
    pub const TELEPORT_MARGIN_FRACTION: f32 = 0.05;

    /// Scale gained over the final phase (1.0 -> 4.0)
    pub const FINAL_PHASE_GROWTH: f32 = 3.0;

    /// Chance a boss teleports away after a non-lethal hit
    pub const BOSS_EVADE_CHANCE: f64 = 0.35;

    /// Win animation: scale increment per tick
    pub const WIN_GROWTH_STEP: f32 = 0.3;
    /// Win animation: tick interval in milliseconds
    pub const WIN_GROWTH_TICK_MS: f64 = 40.0;
    /// Win animation: scale at which growth stops
    pub const WIN_GROWTH_CAP: f32 = 6.0;

    /// Crosshair arm length when no weapon image is ready
    pub const CROSSHAIR_ARM: f32 = 6.0;
}

/// Clamp a coordinate into `[lo, hi]`, falling back to the midpoint when the
/// range is inverted (canvas smaller than the object being clamped).
#[inline]
pub fn clamp_axis(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        value.clamp(lo, hi)
    }
}

/// Clamp a point so a circle of `radius` stays inside a `size` canvas
#[inline]
pub fn clamp_inside(pos: Vec2, radius: f32, size: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(pos.x, radius, size.x - radius),
        clamp_axis(pos.y, radius, size.y - radius),
    )
}
