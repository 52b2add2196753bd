//! Game state and core simulation types

use glam::Vec2;

use crate::consts::*;

/// Lifecycle of one level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No level started yet
    Idle,
    /// Clock running, target fleeing
    Running,
    /// Target defeated (terminal)
    Won,
    /// Clock ran out with the target alive (terminal)
    Lost,
}

/// Notifications for code outside the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    /// Target defeated on the level at `index`
    Complete { index: usize },
    /// Time ran out on the level at `index`
    Failed { index: usize },
}

/// The fleeing target
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Center in canvas pixels
    pub pos: Vec2,
    /// Unscaled radius
    pub radius: f32,
    /// Visual and hitbox multiplier (>= 1)
    pub scale: f32,
    pub hit_points: u32,
    /// Hit points at level start
    pub max_hit_points: u32,
}

impl Target {
    pub fn new(pos: Vec2, radius: f32, hit_points: u32) -> Self {
        Self {
            pos,
            radius,
            scale: 1.0,
            hit_points,
            max_hit_points: hit_points,
        }
    }

    /// Defeated exactly when no hit points remain
    pub fn is_defeated(&self) -> bool {
        self.hit_points == 0
    }

    /// Radius used for hit testing
    pub fn hit_radius(&self) -> f32 {
        self.radius * self.scale
    }

    /// Whether a click at `point` lands on the (alive) target
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_defeated() && point.distance(self.pos) <= self.hit_radius()
    }

    /// Remove one hit point (floor 0) and return what is left
    pub fn take_hit(&mut self) -> u32 {
        self.hit_points = self.hit_points.saturating_sub(1);
        self.hit_points
    }

    /// Keep the unscaled body inside the canvas
    pub fn clamp_to(&mut self, canvas: Vec2) {
        self.pos = crate::clamp_inside(self.pos, self.radius, canvas);
    }
}

/// Cosmetic growth after a win, stepped by the frame clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinAnimation {
    Inactive,
    /// Next growth step is due at `next_tick_ms`
    Growing { next_tick_ms: f64 },
    /// Reached the cap; nothing left to do
    Finished,
}

impl WinAnimation {
    pub fn start(now_ms: f64) -> Self {
        WinAnimation::Growing {
            next_tick_ms: now_ms + WIN_GROWTH_TICK_MS,
        }
    }

    /// Apply every growth step due by `now_ms`. Returns the number applied.
    pub fn advance(&mut self, scale: &mut f32, now_ms: f64) -> u32 {
        let mut steps = 0;
        while let WinAnimation::Growing { next_tick_ms } = *self {
            if now_ms < next_tick_ms {
                break;
            }
            *scale += WIN_GROWTH_STEP;
            steps += 1;
            *self = if *scale >= WIN_GROWTH_CAP {
                WinAnimation::Finished
            } else {
                WinAnimation::Growing {
                    next_tick_ms: next_tick_ms + WIN_GROWTH_TICK_MS,
                }
            };
        }
        steps
    }

    pub fn is_active(&self) -> bool {
        matches!(self, WinAnimation::Growing { .. })
    }
}

/// Per-attempt bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub level_index: usize,
    pub phase: GamePhase,
    /// Host timestamp (ms) when the level started; elapsed time is measured from here
    pub start_ms: f64,
    pub last_frame_ms: f64,
    /// Seconds left on the clock (>= 0)
    pub time_left: f64,
    /// Hurt flash visible until this host timestamp (ms)
    pub hurt_until_ms: Option<f64>,
    pub win_animation: WinAnimation,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            level_index: 0,
            phase: GamePhase::Idle,
            start_ms: 0.0,
            last_frame_ms: 0.0,
            time_left: 0.0,
            hurt_until_ms: None,
            win_animation: WinAnimation::Inactive,
        }
    }
}

impl RunState {
    /// Fresh running state for a level
    pub fn started(level_index: usize, time_seconds: f64, now_ms: f64) -> Self {
        Self {
            level_index,
            phase: GamePhase::Running,
            start_ms: now_ms,
            last_frame_ms: now_ms,
            time_left: time_seconds,
            hurt_until_ms: None,
            win_animation: WinAnimation::Inactive,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_hurt(&self, now_ms: f64) -> bool {
        self.hurt_until_ms.is_some_and(|until| now_ms < until)
    }
}
