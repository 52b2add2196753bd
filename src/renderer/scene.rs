//! Scene painting
//!
//! Pure function of the current game state: reads, never mutates.

use glam::Vec2;

use super::{DrawSurface, colors};
use crate::assets::{ImageSource, TARGET_IMAGE};
use crate::consts::CROSSHAIR_ARM;
use crate::sim::{GamePhase, Target};

/// Message shown after a time-out
pub const LOSE_MESSAGE: &str = "Time's up!";
/// Message shown after the target is defeated
pub const WIN_MESSAGE: &str = "YOU WIN!";

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    /// Canvas buffer size in pixels
    pub canvas: Vec2,
    pub target: &'a Target,
    pub pointer: Vec2,
    pub phase: GamePhase,
    /// Inside the hurt flash window
    pub hurt: bool,
    /// Image name of the cursor weapon
    pub weapon: &'a str,
}

/// Paint one frame
pub fn draw_scene(view: &SceneView, images: &dyn ImageSource, surface: &mut dyn DrawSurface) {
    let canvas = view.canvas;
    surface.begin_frame(canvas);
    surface.fill_rect(Vec2::ZERO, canvas, colors::BACKGROUND);

    draw_target(view, images, surface);

    match view.phase {
        GamePhase::Lost => {
            let font_px = (canvas.x * 0.03).floor().max(18.0);
            let center = Vec2::new(canvas.x / 2.0, canvas.y / 2.0 + 30.0);
            surface.fill_text(LOSE_MESSAGE, center, font_px, colors::LOSE_TEXT);
        }
        GamePhase::Won => {
            surface.fill_rect(Vec2::ZERO, canvas, colors::WIN_OVERLAY);
            let font_px = (canvas.x * 0.06).floor().max(24.0);
            surface.fill_text(WIN_MESSAGE, canvas / 2.0, font_px, colors::WIN_TEXT);
        }
        GamePhase::Idle | GamePhase::Running => {}
    }

    draw_cursor(view, images, surface);
}

fn draw_target(view: &SceneView, images: &dyn ImageSource, surface: &mut dyn DrawSurface) {
    let target = view.target;

    let Some(info) = images.image(TARGET_IMAGE) else {
        let color = if target.is_defeated() {
            colors::TARGET_DEFEATED
        } else {
            colors::TARGET
        };
        surface.fill_circle(target.pos, target.radius * target.scale, color);
        return;
    };

    let width = target.radius * 2.0 * target.scale;
    let size = Vec2::new(width, width / info.aspect());
    let min = target.pos - size / 2.0;
    surface.draw_image(TARGET_IMAGE, min, size);

    if view.hurt {
        surface.fill_rect(min, size, colors::HURT_TINT);
    }

    if target.is_defeated() {
        let line_width = (4.0 * target.scale).max(4.0);
        surface.stroke_line(min, min + size, line_width, colors::DEFEAT_CROSS);
        surface.stroke_line(
            Vec2::new(min.x + size.x, min.y),
            Vec2::new(min.x, min.y + size.y),
            line_width,
            colors::DEFEAT_CROSS,
        );
    } else if target.max_hit_points > 1 {
        let bar_h = 6.0;
        let bar_min = Vec2::new(min.x, min.y - bar_h - 6.0);
        let fraction = target.hit_points as f32 / target.max_hit_points as f32;
        surface.fill_rect(bar_min, Vec2::new(size.x, bar_h), colors::HEALTH_BACK);
        surface.fill_rect(bar_min, Vec2::new(size.x * fraction, bar_h), colors::HEALTH_FILL);
    }
}

fn draw_cursor(view: &SceneView, images: &dyn ImageSource, surface: &mut dyn DrawSurface) {
    let p = view.pointer;
    if let Some(info) = images.image(view.weapon) {
        let width = (view.canvas.min_element() * 0.04).floor().max(36.0);
        let size = Vec2::new(width, width / info.aspect());
        surface.draw_image(view.weapon, p - size / 2.0, size);
    } else {
        let arm_x = Vec2::new(CROSSHAIR_ARM, 0.0);
        let arm_y = Vec2::new(0.0, CROSSHAIR_ARM);
        surface.stroke_line(p - arm_x, p + arm_x, 1.0, colors::CROSSHAIR);
        surface.stroke_line(p - arm_y, p + arm_y, 1.0, colors::CROSSHAIR);
    }
}
