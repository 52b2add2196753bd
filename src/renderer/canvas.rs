//! Canvas 2D backend for the browser

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, DrawSurface, css_color};
use crate::assets::ImageCache;

/// Font stack for overlay messages
const FONT_FAMILY: &str = "'DM Serif Display', serif";

/// Draws onto a canvas element, pulling image elements from the cache
pub struct CanvasSurface<'a> {
    canvas: &'a HtmlCanvasElement,
    ctx: &'a CanvasRenderingContext2d,
    images: &'a ImageCache,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(
        canvas: &'a HtmlCanvasElement,
        ctx: &'a CanvasRenderingContext2d,
        images: &'a ImageCache,
    ) -> Self {
        Self {
            canvas,
            ctx,
            images,
        }
    }
}

impl DrawSurface for CanvasSurface<'_> {
    fn begin_frame(&mut self, size: Vec2) {
        let (w, h) = (size.x.max(0.0) as u32, size.y.max(0.0) as u32);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx
            .fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn draw_image(&mut self, name: &str, min: Vec2, size: Vec2) {
        let Some(img) = self.images.element(name) else {
            return;
        };
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            min.x as f64,
            min.y as f64,
            size.x as f64,
            size.y as f64,
        );
    }

    fn fill_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_font(&format!("{}px {}", font_px, FONT_FAMILY));
        let _ = self.ctx.fill_text(text, center.x as f64, center.y as f64);
    }
}
