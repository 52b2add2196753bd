//! Simulation module
//!
//! All gameplay logic lives here:
//! - Time comes in from the host as millisecond timestamps
//! - Seeded RNG only (teleports, boss evasion)
//! - No platform dependencies; painting goes through `renderer::DrawSurface`

pub mod game;
pub mod motion;
pub mod state;

pub use game::{ClickOutcome, Game, ListenerId};
pub use state::{GamePhase, LevelEvent, RunState, Target, WinAnimation};
