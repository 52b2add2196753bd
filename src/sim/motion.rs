//! Target motion and difficulty curves
//!
//! Small pure functions so speed and teleport read the same aggression value.

use glam::Vec2;
use rand::Rng;

use super::state::Target;
use crate::consts::*;
use crate::tuning::LevelConfig;

/// Target radius for a canvas (shrinks with small screens, never below the minimum)
pub fn target_radius(canvas: Vec2) -> f32 {
    (canvas.min_element() * TARGET_RADIUS_FRACTION)
        .floor()
        .max(MIN_TARGET_RADIUS)
}

/// Flee speed before level and aggression scaling (pixels/s)
pub fn base_speed(canvas: Vec2) -> f32 {
    (canvas.min_element() * BASE_SPEED_FRACTION)
        .floor()
        .max(MIN_BASE_SPEED)
}

/// Time pressure in `0..=1`: 0 at level start, 1 when the clock hits zero
pub fn aggression(time_budget: f64, time_left: f64) -> f32 {
    if time_budget <= 0.0 {
        return 1.0;
    }
    ((time_budget - time_left) / time_budget).clamp(0.0, 1.0) as f32
}

/// Unit vector pointing from the pointer to the target (zero when on top of it)
pub fn flee_direction(target: Vec2, pointer: Vec2) -> Vec2 {
    let away = target - pointer;
    let dist = away.length();
    if dist < FLEE_DEAD_ZONE {
        Vec2::ZERO
    } else {
        away / dist
    }
}

/// Final flee speed (pixels/s)
pub fn flee_speed(base: f32, level_multiplier: f32, aggression: f32) -> f32 {
    base * level_multiplier * (1.0 + aggression * AGGRESSION_SPEED_BOOST)
}

/// Per-frame teleport probability
pub fn teleport_chance(level: &LevelConfig, aggression: f32) -> f64 {
    level.teleport_chance_base + level.teleport_chance_aggression * aggression as f64
}

/// Distance a teleport keeps from the edges along an axis of length `axis`
pub fn teleport_margin(axis: f32) -> f32 {
    (axis * TELEPORT_MARGIN_FRACTION).floor().max(MIN_TELEPORT_MARGIN)
}

/// Uniform point inside the teleport margins (axis center if the margins overlap)
pub fn teleport_point<R: Rng>(canvas: Vec2, rng: &mut R) -> Vec2 {
    let mut axis = |len: f32| {
        let margin = teleport_margin(len);
        let span = len - margin * 2.0;
        if span <= 0.0 {
            len / 2.0
        } else {
            (margin + rng.random::<f32>() * span).clamp(margin, len - margin)
        }
    };
    let x = axis(canvas.x);
    let y = axis(canvas.y);
    Vec2::new(x, y)
}

/// Relocate the target to a random interior point
pub fn teleport<R: Rng>(target: &mut Target, canvas: Vec2, rng: &mut R) {
    target.pos = teleport_point(canvas, rng);
    target.clamp_to(canvas);
}

/// Scale during the final phase, `None` before it starts
pub fn growth_scale(time_budget: f64, time_left: f64, last_phase: f32) -> Option<f32> {
    let phase_len = time_budget * last_phase as f64;
    if phase_len <= 0.0 || time_left > phase_len {
        return None;
    }
    let t = (1.0 - time_left / phase_len).clamp(0.0, 1.0) as f32;
    Some(1.0 + t * FINAL_PHASE_GROWTH)
}
