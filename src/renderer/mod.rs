//! 2D rendering module
//!
//! The scene is painted through a minimal immediate-mode `DrawSurface`. The
//! browser backs it with a canvas 2D context; tests record the calls.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{SceneView, draw_scene};

use glam::Vec2;

/// RGBA, each channel 0..=1
pub type Color = [f32; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.133, 0.133, 0.133, 1.0]; // #222
    pub const TARGET: Color = [1.0, 0.847, 0.420, 1.0]; // #ffd86b
    pub const TARGET_DEFEATED: Color = [0.6, 0.6, 0.6, 1.0]; // #999
    pub const HURT_TINT: Color = [1.0, 0.0, 0.0, 0.35];
    pub const DEFEAT_CROSS: Color = [1.0, 0.0, 0.0, 1.0];
    pub const HEALTH_BACK: Color = [0.0, 0.0, 0.0, 0.6];
    pub const HEALTH_FILL: Color = [0.9, 0.15, 0.15, 1.0];
    pub const LOSE_TEXT: Color = [1.0, 0.302, 0.302, 1.0]; // #ff4d4d
    pub const WIN_OVERLAY: Color = [0.0, 0.0, 0.0, 0.5];
    pub const WIN_TEXT: Color = [0.486, 0.988, 0.0, 1.0]; // #7CFC00
    pub const CROSSHAIR: Color = [1.0, 1.0, 1.0, 1.0];
}

/// CSS `rgba()` string for a color
pub fn css_color(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({},{},{},{})",
        (r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        a.clamp(0.0, 1.0)
    )
}

/// Immediate-mode 2D drawing target
pub trait DrawSurface {
    /// Size the pixel buffer to `size` (if needed) and clear it
    fn begin_frame(&mut self, size: Vec2);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    /// Draw a ready image stretched into the given box
    fn draw_image(&mut self, name: &str, min: Vec2, size: Vec2);
    /// Text centered on `center`
    fn fill_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color);
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame { size: Vec2 },
    FillRect { min: Vec2, size: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeLine { from: Vec2, to: Vec2, width: f32, color: Color },
    Image { name: String, min: Vec2, size: Vec2 },
    Text { text: String, center: Vec2, font_px: f32, color: Color },
}

/// Recording surface (headless runs, tests)
impl DrawSurface for Vec<DrawCommand> {
    fn begin_frame(&mut self, size: Vec2) {
        self.clear();
        self.push(DrawCommand::BeginFrame { size });
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.push(DrawCommand::FillRect { min, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }

    fn draw_image(&mut self, name: &str, min: Vec2, size: Vec2) {
        self.push(DrawCommand::Image {
            name: name.to_string(),
            min,
            size,
        });
    }

    fn fill_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            center,
            font_px,
            color,
        });
    }
}
