//! The game: level lifecycle, per-frame simulation, hit testing
//!
//! All timestamps are host milliseconds (`performance.now()` on the web). The
//! host owns the clock and hands it in; nothing here reads wall time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::motion;
use super::state::{GamePhase, LevelEvent, RunState, Target, WinAnimation};
use crate::assets::ImageSource;
use crate::consts::BOSS_EVADE_CHANCE;
use crate::platform::{FrameHandle, FrameScheduler, Viewport};
use crate::renderer::{DrawSurface, SceneView, draw_scene};
use crate::tuning::{LevelCatalog, LevelConfig};
use crate::ui::{self, UiSinks, format_time};
use crate::weapons::DEFAULT_WEAPON;

/// Radius of the placeholder target before any level starts
const IDLE_TARGET_RADIUS: f32 = 36.0;

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No level running
    Ignored,
    Miss,
    /// Non-lethal hit; `remaining` hit points left
    Hit { remaining: u32 },
    /// Last hit point removed; level won
    Defeated,
}

/// Handle returned by [`Game::on_level_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(LevelEvent)>;

/// Owns all mutable game state and drives one frame at a time
pub struct Game {
    levels: LevelCatalog,
    /// Canvas pixel buffer size
    buffer_size: Vec2,
    /// Displayed canvas size reported by the host
    display_size: Vec2,
    target: Target,
    pointer: Vec2,
    run: RunState,
    weapon: String,
    rng: Pcg32,
    ui: UiSinks,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u32,
    scheduler: Box<dyn FrameScheduler>,
    pending_frame: Option<FrameHandle>,
    looping: bool,
}

impl Game {
    pub fn new(
        levels: LevelCatalog,
        canvas_size: Vec2,
        seed: u64,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        let center = canvas_size / 2.0;
        Self {
            levels,
            buffer_size: canvas_size,
            display_size: canvas_size,
            target: Target::new(center, IDLE_TARGET_RADIUS, 1),
            pointer: center,
            run: RunState::default(),
            weapon: DEFAULT_WEAPON.to_string(),
            rng: Pcg32::seed_from_u64(seed),
            ui: UiSinks::default(),
            listeners: Vec::new(),
            next_listener_id: 1,
            scheduler,
            pending_frame: None,
            looping: false,
        }
    }

    pub fn set_ui(&mut self, ui: UiSinks) {
        self.ui = ui;
    }

    /// Register a level-complete/level-failed listener. Listeners run
    /// synchronously, after the state change that caused the event.
    pub fn on_level_event(&mut self, listener: impl FnMut(LevelEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    // === Accessors ===

    pub fn levels(&self) -> &LevelCatalog {
        &self.levels
    }

    pub fn level_index(&self) -> usize {
        self.run.level_index
    }

    pub fn current_level(&self) -> Option<&LevelConfig> {
        self.levels.get(self.run.level_index)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    /// Seconds left on the clock
    pub fn time_left(&self) -> f64 {
        self.run.time_left
    }

    /// Current time pressure, derived from the clock
    pub fn aggression(&self) -> f32 {
        self.current_level()
            .map_or(0.0, |level| motion::aggression(level.time_seconds, self.run.time_left))
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.buffer_size
    }

    pub fn weapon(&self) -> &str {
        &self.weapon
    }

    /// True while the frame loop is armed
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    // === Level lifecycle ===

    /// Start (or restart) the level at `index`, clamped into the catalog
    pub fn start_level(&mut self, index: usize, now_ms: f64) {
        let index = self.levels.clamp_index(index);
        self.sync_canvas_size();

        let Some(level) = self.levels.get(index) else {
            log::warn!("No levels to start");
            return;
        };

        let radius = motion::target_radius(self.buffer_size);
        self.target = Target::new(self.buffer_size / 2.0, radius, level.hit_points());
        self.run = RunState::started(index, level.time_seconds, now_ms);

        self.ui.set_level_name(&level.name);
        self.ui.set_state_label(ui::LABEL_PLAYING);
        self.ui.set_timer(&format_time(level.time_seconds));
        log::info!(
            "Level {} '{}' started ({}s, {} hp)",
            index + 1,
            level.name,
            level.time_seconds,
            self.target.hit_points
        );

        motion::teleport(&mut self.target, self.buffer_size, &mut self.rng);
        self.restart_loop();
    }

    /// Advance to the next level (replays the last one at the end of the catalog)
    pub fn next_level(&mut self, now_ms: f64) {
        let next = self.run.level_index.saturating_add(1);
        self.start_level(self.levels.clamp_index(next), now_ms);
    }

    pub fn restart_level(&mut self, now_ms: f64) {
        self.start_level(self.run.level_index, now_ms);
    }

    /// Halt the frame loop; game state is left as is
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.looping {
            log::debug!("Frame loop stopped");
        }
        self.looping = false;
    }

    fn restart_loop(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.looping = true;
        self.pending_frame = self.scheduler.request_frame();
    }

    // === Input ===

    /// Track the pointer (always, so the cursor renders between levels)
    pub fn on_pointer_move(&mut self, client: Vec2, viewport: Viewport) {
        self.pointer = viewport.map_to_canvas(client, self.buffer_size);
    }

    pub fn on_pointer_click(&mut self, client: Vec2, viewport: Viewport, now_ms: f64) -> ClickOutcome {
        if !self.run.is_running() {
            return ClickOutcome::Ignored;
        }
        let point = viewport.map_to_canvas(client, self.buffer_size);
        self.click_at(point, now_ms)
    }

    /// Hit test a click already in canvas pixels
    pub fn click_at(&mut self, point: Vec2, now_ms: f64) -> ClickOutcome {
        if !self.run.is_running() {
            return ClickOutcome::Ignored;
        }
        if !self.target.contains(point) {
            return ClickOutcome::Miss;
        }
        let Some(level) = self.levels.get(self.run.level_index) else {
            return ClickOutcome::Ignored;
        };
        let (flash_ms, boss) = (level.hit_flash_ms(), level.is_boss());

        let remaining = self.target.take_hit();
        if remaining > 0 {
            self.run.hurt_until_ms = Some(now_ms + flash_ms);
            if boss && self.rng.random::<f64>() < BOSS_EVADE_CHANCE {
                motion::teleport(&mut self.target, self.buffer_size, &mut self.rng);
            }
            log::debug!("Hit! {} hp left", remaining);
            return ClickOutcome::Hit { remaining };
        }

        self.run.phase = GamePhase::Won;
        self.run.win_animation = WinAnimation::start(now_ms);
        self.ui.set_state_label(ui::LABEL_WIN);
        log::info!(
            "Level {} won with {:.1}s left",
            self.run.level_index + 1,
            self.run.time_left
        );
        self.emit(LevelEvent::Complete {
            index: self.run.level_index,
        });
        ClickOutcome::Defeated
    }

    /// Swap the cursor image; no gameplay effect
    pub fn set_weapon(&mut self, id: &str) {
        if self.weapon != id {
            log::info!("Cursor weapon: {}", id);
            self.weapon = id.to_string();
        }
    }

    // === Frame loop ===

    /// Report the displayed canvas size; applied at the next frame or level start
    pub fn set_display_size(&mut self, size: Vec2) {
        self.display_size = size;
    }

    /// Resize the buffer to the displayed size and re-clamp positions.
    /// Returns true if the size changed.
    fn sync_canvas_size(&mut self) -> bool {
        let display = self.display_size;
        if display == self.buffer_size || display.x <= 0.0 || display.y <= 0.0 {
            return false;
        }
        log::debug!("Canvas resized to {}x{}", display.x, display.y);
        self.buffer_size = display;
        self.target.clamp_to(display);
        self.pointer = self.pointer.clamp(Vec2::ZERO, display);
        true
    }

    /// One display refresh: simulate, paint, re-arm
    pub fn frame(&mut self, now_ms: f64, images: &dyn ImageSource, surface: &mut dyn DrawSurface) {
        if !self.looping {
            log::debug!("Ignoring frame delivered after stop");
            return;
        }
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }

        self.step(now_ms);
        draw_scene(&self.scene(now_ms), images, surface);

        self.pending_frame = self.scheduler.request_frame();
    }

    /// Advance the simulation to `now_ms` without painting
    pub fn step(&mut self, now_ms: f64) {
        self.sync_canvas_size();

        let dt = ((now_ms - self.run.last_frame_ms) / 1000.0).max(0.0) as f32;
        self.run.last_frame_ms = now_ms;

        if let Some(level) = self.levels.get(self.run.level_index) {
            if self.run.is_running() && !self.target.is_defeated() {
                let elapsed = (now_ms - self.run.start_ms) / 1000.0;
                let time_left = (level.time_seconds - elapsed).max(0.0);
                self.run.time_left = self.run.time_left.min(time_left);
                self.ui.set_timer(&format_time(self.run.time_left.ceil()));

                let aggression = motion::aggression(level.time_seconds, self.run.time_left);

                let dir = motion::flee_direction(self.target.pos, self.pointer);
                let speed = motion::flee_speed(
                    motion::base_speed(self.buffer_size),
                    level.base_speed_multiplier,
                    aggression,
                );
                self.target.pos += dir * speed * dt;
                self.target.clamp_to(self.buffer_size);

                if self.rng.random::<f64>() < motion::teleport_chance(level, aggression) {
                    motion::teleport(&mut self.target, self.buffer_size, &mut self.rng);
                }

                if let Some(scale) = motion::growth_scale(
                    level.time_seconds,
                    self.run.time_left,
                    level.last_phase_percent,
                ) {
                    self.target.scale = self.target.scale.max(scale);
                }
            }
        }

        if self.run.is_running() && self.run.time_left <= 0.0 && !self.target.is_defeated() {
            self.run.phase = GamePhase::Lost;
            self.ui.set_state_label(ui::LABEL_LOSE);
            log::info!("Level {} lost: time is up", self.run.level_index + 1);
            self.emit(LevelEvent::Failed {
                index: self.run.level_index,
            });
        }

        self.run
            .win_animation
            .advance(&mut self.target.scale, now_ms);
    }

    /// Read-only snapshot for the renderer
    pub fn scene(&self, now_ms: f64) -> SceneView<'_> {
        SceneView {
            canvas: self.buffer_size,
            target: &self.target,
            pointer: self.pointer,
            phase: self.run.phase,
            hurt: self.run.is_hurt(now_ms),
            weapon: &self.weapon,
        }
    }

    fn emit(&mut self, event: LevelEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StaticImages;
    use crate::platform::ManualScheduler;
    use crate::renderer::DrawCommand;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn test_level(health: Option<u32>) -> LevelConfig {
        LevelConfig {
            id: 1,
            name: "Test".to_string(),
            time_seconds: 60.0,
            base_speed_multiplier: 1.0,
            teleport_chance_base: 0.0,
            teleport_chance_aggression: 0.0,
            last_phase_percent: 0.35,
            health,
            hit_flash_ms: None,
            secret: false,
        }
    }

    fn game_with(levels: Vec<LevelConfig>) -> (Game, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let catalog = LevelCatalog::new(levels).unwrap();
        let game = Game::new(catalog, CANVAS, 7, Box::new(scheduler.clone()));
        (game, scheduler)
    }

    fn record_events(game: &mut Game) -> Rc<RefCell<Vec<LevelEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        game.on_level_event(move |e| sink.borrow_mut().push(e));
        events
    }

    fn identity() -> Viewport {
        Viewport::new(0.0, 0.0, CANVAS.x, CANVAS.y)
    }

    #[test]
    fn test_starts_idle() {
        let (game, scheduler) = game_with(vec![test_level(None)]);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(!game.is_looping());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_start_level_resets_target() {
        let (mut game, _) = game_with(vec![test_level(Some(3))]);
        game.start_level(0, 0.0);

        let target = game.target();
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(target.radius, 28.0);
        assert_eq!(target.scale, 1.0);
        assert_eq!(target.hit_points, 3);
        assert_eq!(game.time_left(), 60.0);
        // Initial teleport lands inside the margins
        assert!(target.pos.x >= 60.0 && target.pos.x <= 740.0);
        assert!(target.pos.y >= 60.0 && target.pos.y <= 540.0);
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let (mut game, _) = game_with(vec![test_level(None), test_level(None)]);
        game.start_level(42, 0.0);
        assert_eq!(game.level_index(), 1);

        game.next_level(10.0);
        assert_eq!(game.level_index(), 1);
    }

    #[test]
    fn test_next_and_restart() {
        let (mut game, _) = game_with(vec![test_level(None), test_level(Some(2))]);
        game.start_level(0, 0.0);
        game.next_level(5.0);
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.target().hit_points, 2);

        game.step(30_000.0);
        game.restart_level(30_000.0);
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.time_left(), 60.0);
    }

    #[test]
    fn test_speed_scenario_at_level_start() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        assert_eq!(game.aggression(), 0.0);
        // t = 0: exactly the base speed
        assert_eq!(
            motion::flee_speed(motion::base_speed(CANVAS), 1.0, game.aggression()),
            60.0
        );

        let start = game.target().pos;
        game.on_pointer_move(start - Vec2::new(10.0, 0.0), identity());
        game.step(100.0);

        let expected = motion::flee_speed(60.0, 1.0, motion::aggression(60.0, 59.9)) * 0.1;
        let moved = game.target().pos - start;
        assert!((moved.x - expected).abs() < 1e-2, "moved {moved:?}");
        assert!(moved.y.abs() < 1e-4);
    }

    #[test]
    fn test_aggression_and_growth_at_45_seconds() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        game.step(45_000.0);

        assert!((game.time_left() - 15.0).abs() < 1e-9);
        assert!((game.aggression() - 0.75).abs() < 1e-6);
        // 15 <= 60 * 0.35: growth active
        assert!(game.target().scale > 1.0);
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn test_boss_takes_five_hits() {
        let (mut game, _) = game_with(vec![test_level(Some(5))]);
        let events = record_events(&mut game);
        game.start_level(0, 0.0);

        for (i, expected) in [4, 3, 2, 1].into_iter().enumerate() {
            let now = 100.0 * (i + 1) as f64;
            let pos = game.target().pos;
            assert_eq!(
                game.click_at(pos, now),
                ClickOutcome::Hit {
                    remaining: expected
                }
            );
            assert!(!game.target().is_defeated());
            assert!(game.run_state().is_hurt(now));
            assert!(events.borrow().is_empty());
        }

        let pos = game.target().pos;
        assert_eq!(game.click_at(pos, 500.0), ClickOutcome::Defeated);
        assert_eq!(game.target().hit_points, 0);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(*events.borrow(), vec![LevelEvent::Complete { index: 0 }]);
    }

    #[test]
    fn test_boss_evades_about_a_third_of_hits() {
        let seeds = 400;
        let mut moved = 0;
        for seed in 0..seeds {
            let catalog = LevelCatalog::new(vec![test_level(Some(5))]).unwrap();
            let mut game = Game::new(catalog, CANVAS, seed, Box::new(ManualScheduler::new()));
            game.start_level(0, 0.0);

            let before = game.target().pos;
            assert_eq!(
                game.click_at(before, 10.0),
                ClickOutcome::Hit { remaining: 4 }
            );
            let after = game.target().pos;
            if after != before {
                moved += 1;
                assert!(after.x >= 60.0 && after.x <= CANVAS.x - 60.0, "{after:?}");
                assert!(after.y >= 60.0 && after.y <= CANVAS.y - 60.0, "{after:?}");
            }
        }
        let rate = moved as f64 / seeds as f64;
        assert!((0.25..=0.45).contains(&rate), "evade rate {rate}");
    }

    #[test]
    fn test_single_hit_levels_never_evade() {
        for health in [None, Some(1)] {
            for seed in 0..100 {
                let catalog = LevelCatalog::new(vec![test_level(health)]).unwrap();
                let mut game =
                    Game::new(catalog, CANVAS, seed, Box::new(ManualScheduler::new()));
                game.start_level(0, 0.0);

                let before = game.target().pos;
                assert_eq!(game.click_at(before, 10.0), ClickOutcome::Defeated);
                assert_eq!(game.target().pos, before);
            }
        }
    }

    #[test]
    fn test_hurt_flash_expires() {
        let mut level = test_level(Some(2));
        level.hit_flash_ms = Some(250.0);
        let (mut game, _) = game_with(vec![level]);
        game.start_level(0, 0.0);

        let pos = game.target().pos;
        game.click_at(pos, 1000.0);
        assert!(game.scene(1100.0).hurt);
        assert!(!game.scene(1250.0).hurt);
    }

    #[test]
    fn test_miss_is_noop() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        let events = record_events(&mut game);
        game.start_level(0, 0.0);

        let target = game.target().clone();
        let off = target.pos + Vec2::new(target.hit_radius() + 5.0, 0.0);
        assert_eq!(game.click_at(off, 10.0), ClickOutcome::Miss);
        assert_eq!(game.target().hit_points, 1);
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_click_ignored_when_not_running() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        let pos = game.target().pos;
        assert_eq!(game.click_at(pos, 0.0), ClickOutcome::Ignored);
        assert_eq!(
            game.on_pointer_click(pos, identity(), 0.0),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn test_pointer_click_maps_viewport() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        let pos = game.target().pos;

        // Canvas displayed at half size, offset by (20, 40)
        let viewport = Viewport::new(20.0, 40.0, 400.0, 300.0);
        let client = Vec2::new(20.0, 40.0) + pos / 2.0;
        assert_eq!(
            game.on_pointer_click(client, viewport, 10.0),
            ClickOutcome::Defeated
        );
    }

    #[test]
    fn test_timeout_loses_once() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        let events = record_events(&mut game);
        let label = Rc::new(RefCell::new(String::new()));
        game.set_ui(UiSinks {
            state_label: Some(Box::new(label.clone())),
            ..UiSinks::default()
        });

        game.start_level(0, 0.0);
        game.step(60_000.0);
        game.step(61_000.0);

        assert_eq!(game.phase(), GamePhase::Lost);
        assert_eq!(game.time_left(), 0.0);
        assert_eq!(*label.borrow(), ui::LABEL_LOSE);
        assert_eq!(*events.borrow(), vec![LevelEvent::Failed { index: 0 }]);

        let pos = game.target().pos;
        assert_eq!(game.click_at(pos, 61_500.0), ClickOutcome::Ignored);
        assert_eq!(game.target().hit_points, 1);
    }

    #[test]
    fn test_target_frozen_after_win() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        let pos = game.target().pos;
        game.click_at(pos, 100.0);

        game.on_pointer_move(pos + Vec2::new(1.0, 1.0), identity());
        game.step(2_000.0);
        assert_eq!(game.target().pos, pos);
        // Clock stops at the moment of the win
        assert_eq!(game.time_left(), 60.0);
    }

    #[test]
    fn test_win_animation_driven_by_frames() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        let pos = game.target().pos;
        game.click_at(pos, 1_000.0);

        game.step(1_040.0);
        assert!((game.target().scale - 1.3).abs() < 1e-5);
        assert!(game.run_state().win_animation.is_active());

        game.step(5_000.0);
        assert_eq!(game.run_state().win_animation, WinAnimation::Finished);
        let capped = game.target().scale;
        assert!(capped >= crate::consts::WIN_GROWTH_CAP);

        game.step(9_000.0);
        assert_eq!(game.target().scale, capped);
    }

    #[test]
    fn test_restart_mid_animation_clears_everything() {
        let (mut game, _) = game_with(vec![test_level(Some(5))]);
        game.start_level(0, 0.0);
        let pos = game.target().pos;
        game.click_at(pos, 100.0);
        game.step(50_000.0);
        assert!(game.target().scale > 1.0);

        game.start_level(0, 50_000.0);
        assert_eq!(game.target().scale, 1.0);
        assert_eq!(game.target().hit_points, 5);
        assert_eq!(game.target().radius, 28.0);
        assert_eq!(game.time_left(), 60.0);
        assert_eq!(game.run_state().hurt_until_ms, None);
        assert_eq!(game.run_state().win_animation, WinAnimation::Inactive);

        // And after a win
        for i in 0..5 {
            let pos = game.target().pos;
            game.click_at(pos, 50_100.0 + i as f64);
        }
        game.step(50_200.0);
        assert_eq!(game.phase(), GamePhase::Won);
        game.restart_level(50_300.0);
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.target().scale, 1.0);
        assert_eq!(game.run_state().win_animation, WinAnimation::Inactive);
    }

    #[test]
    fn test_single_frame_loop() {
        let (mut game, scheduler) = game_with(vec![test_level(None)]);
        let images = StaticImages::new();
        let mut surface: Vec<DrawCommand> = Vec::new();

        game.start_level(0, 0.0);
        game.start_level(0, 5.0);
        assert_eq!(scheduler.pending_count(), 1);

        for i in 1..=5 {
            assert!(scheduler.fire().is_some());
            game.frame(16.0 * i as f64, &images, &mut surface);
            assert_eq!(scheduler.pending_count(), 1);
        }
        assert!(matches!(surface[0], DrawCommand::BeginFrame { .. }));

        game.stop();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!game.is_looping());
    }

    #[test]
    fn test_frame_after_stop_is_ignored() {
        let (mut game, scheduler) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        game.stop();

        let before = game.run_state().clone();
        let mut surface: Vec<DrawCommand> = Vec::new();
        game.frame(500.0, &StaticImages::new(), &mut surface);
        assert!(surface.is_empty());
        assert_eq!(*game.run_state(), before);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_stop_twice_is_safe() {
        let (mut game, scheduler) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        game.step(1_000.0);

        game.stop();
        let target = game.target().clone();
        let run = game.run_state().clone();
        let cancelled = scheduler.cancelled();

        game.stop();
        assert_eq!(*game.target(), target);
        assert_eq!(*game.run_state(), run);
        assert_eq!(scheduler.cancelled(), cancelled);
        // Stopping does not end the attempt
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn test_resize_reclamps_positions() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        game.on_pointer_move(Vec2::new(790.0, 590.0), identity());
        game.target.pos = Vec2::new(770.0, 570.0);

        game.set_display_size(Vec2::new(400.0, 300.0));
        game.step(16.0);

        assert_eq!(game.canvas_size(), Vec2::new(400.0, 300.0));
        let t = game.target();
        assert!(t.pos.x <= 400.0 - t.radius && t.pos.y <= 300.0 - t.radius);
        assert!(game.pointer().x <= 400.0 && game.pointer().y <= 300.0);
    }

    #[test]
    fn test_ui_sinks_receive_updates() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        let timer = Rc::new(RefCell::new(String::new()));
        let name = Rc::new(RefCell::new(String::new()));
        let label = Rc::new(RefCell::new(String::new()));
        game.set_ui(UiSinks {
            timer: Some(Box::new(timer.clone())),
            level_name: Some(Box::new(name.clone())),
            state_label: Some(Box::new(label.clone())),
        });

        game.start_level(0, 0.0);
        assert_eq!(*timer.borrow(), "01:00");
        assert_eq!(*name.borrow(), "Test");
        assert_eq!(*label.borrow(), ui::LABEL_PLAYING);

        game.step(200.0);
        assert_eq!(*timer.borrow(), "01:00");
        game.step(1_500.0);
        assert_eq!(*timer.borrow(), "00:59");

        let pos = game.target().pos;
        game.click_at(pos, 1_600.0);
        assert_eq!(*label.borrow(), ui::LABEL_WIN);
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        let events = Rc::new(RefCell::new(0));
        let counter = events.clone();
        let id = game.on_level_event(move |_| *counter.borrow_mut() += 1);
        assert!(game.remove_listener(id));

        game.start_level(0, 0.0);
        game.step(61_000.0);
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn test_set_weapon_is_cosmetic() {
        let (mut game, _) = game_with(vec![test_level(None)]);
        game.start_level(0, 0.0);
        let run = game.run_state().clone();
        game.set_weapon("llama");
        assert_eq!(game.weapon(), "llama");
        assert_eq!(game.scene(0.0).weapon, "llama");
        assert_eq!(*game.run_state(), run);
    }

    proptest! {
        #[test]
        fn prop_target_stays_in_bounds_and_clock_never_rises(
            seed in any::<u64>(),
            moves in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0, 0.0f64..2_000.0), 1..60),
        ) {
            let mut level = test_level(Some(3));
            level.base_speed_multiplier = 25.0;
            level.teleport_chance_base = 0.2;
            level.teleport_chance_aggression = 0.5;
            let catalog = LevelCatalog::new(vec![level]).unwrap();
            let mut game = Game::new(catalog, CANVAS, seed, Box::new(ManualScheduler::new()));
            game.start_level(0, 0.0);

            let mut now = 0.0;
            let mut last_left = game.time_left();
            for (x, y, dt) in moves {
                now += dt;
                game.on_pointer_move(Vec2::new(x, y), identity());
                game.step(now);

                let t = game.target();
                prop_assert!(t.pos.x >= t.radius && t.pos.x <= CANVAS.x - t.radius);
                prop_assert!(t.pos.y >= t.radius && t.pos.y <= CANVAS.y - t.radius);
                prop_assert!(game.time_left() >= 0.0);
                prop_assert!(game.time_left() <= last_left);
                prop_assert_eq!(t.is_defeated(), t.hit_points == 0);
                last_left = game.time_left();
            }
        }
    }
}
