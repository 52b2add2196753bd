//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Pointer coordinate mapping (viewport -> canvas buffer pixels)
//! - Frame scheduling (`requestAnimationFrame` on web, manual stepping natively)

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// Where the canvas is displayed, in viewport (CSS) pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the displayed canvas
    pub origin: Vec2,
    /// Displayed width/height
    pub size: Vec2,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }

    /// Map a viewport point into the canvas pixel buffer of size `buffer`
    pub fn map_to_canvas(&self, client: Vec2, buffer: Vec2) -> Vec2 {
        let ratio = Vec2::new(
            if self.size.x > 0.0 { buffer.x / self.size.x } else { 1.0 },
            if self.size.y > 0.0 { buffer.y / self.size.y } else { 1.0 },
        );
        (client - self.origin) * ratio
    }
}

/// Opaque id of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Host display-refresh scheduler
///
/// At most one request is outstanding per game; the game cancels before it
/// requests again.
pub trait FrameScheduler {
    /// Ask for one frame callback. `None` if the host refused.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    /// Drop a previously requested callback that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ScheduleLog {
    next_id: i32,
    pending: Vec<FrameHandle>,
    requested: u32,
    cancelled: u32,
}

/// Scheduler driven by hand: the host pops pending frames and calls
/// `Game::frame` itself. Used for headless runs and tests. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    log: Rc<RefCell<ScheduleLog>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requested callbacks that have neither fired nor been cancelled
    pub fn pending_count(&self) -> usize {
        self.log.borrow().pending.len()
    }

    /// Fire the oldest pending callback (removes it from the queue)
    pub fn fire(&self) -> Option<FrameHandle> {
        let mut log = self.log.borrow_mut();
        if log.pending.is_empty() {
            None
        } else {
            Some(log.pending.remove(0))
        }
    }

    pub fn requested(&self) -> u32 {
        self.log.borrow().requested
    }

    pub fn cancelled(&self) -> u32 {
        self.log.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let handle = FrameHandle(log.next_id);
        log.pending.push(handle);
        log.requested += 1;
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.log.borrow_mut();
        let before = log.pending.len();
        log.pending.retain(|h| *h != handle);
        if log.pending.len() != before {
            log.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_to_canvas_scales_by_buffer_ratio() {
        // Displayed at 400x300 starting at (10, 20), buffer is 800x600
        let viewport = Viewport::new(10.0, 20.0, 400.0, 300.0);
        let mapped = viewport.map_to_canvas(Vec2::new(110.0, 170.0), Vec2::new(800.0, 600.0));
        assert!((mapped.x - 200.0).abs() < 0.001);
        assert!((mapped.y - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_map_to_canvas_zero_sized_viewport() {
        let viewport = Viewport::new(0.0, 0.0, 0.0, 0.0);
        let mapped = viewport.map_to_canvas(Vec2::new(5.0, 7.0), Vec2::new(800.0, 600.0));
        assert_eq!(mapped, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn test_manual_scheduler_tracks_pending() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame().unwrap();
        let b = scheduler.request_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count(), 2);

        scheduler.cancel_frame(a);
        scheduler.cancel_frame(a);
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.fire(), Some(b));
        assert_eq!(scheduler.fire(), None);
        assert_eq!(scheduler.requested(), 2);
    }
}
