//! SDL2 window backend. Circles are rasterized as polygons; shadow blur and
//! the soft filter are approximated with stacked translucent rings. Contrast
//! and saturation gains are not reproduced.

use log::debug;
use nalgebra::{Point2, Vector2};
use sdl2::{
    gfx::primitives::DrawRenderer,
    pixels::Color,
    render::{BlendMode, Canvas},
    video::Window,
};
use std::f64::consts::TAU;

use super::{Filter, StateStack, Surface};
use crate::color::{Rgb, Rgba};

const SEGMENTS: usize = 28;
const GLOW_LAYERS: usize = 6;

fn to_color(rgb: Rgb, alpha: f64) -> Color {
    Color::RGBA(rgb.r, rgb.g, rgb.b, (alpha.clamp(0., 1.) * 255.).round() as u8)
}

fn to_coord(v: f64) -> i16 {
    v.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

pub struct SdlSurface {
    canvas: Canvas<Window>,
    width: u32,
    height: u32,
    state: StateStack,
}

impl SdlSurface {
    /// Wraps a window canvas whose backing store is `width` x `height`
    /// pixels, stretched over the whole window.
    pub fn new(canvas: Canvas<Window>, width: u32, height: u32) -> SdlSurface {
        let mut surface = SdlSurface {
            canvas,
            width,
            height,
            state: StateStack::default(),
        };
        surface.canvas.set_blend_mode(BlendMode::Blend);
        surface.resize(width, height);
        surface
    }

    fn fit_to_window(&mut self) {
        let (out_w, out_h) = match self.canvas.output_size() {
            Ok(size) => size,
            Err(e) => {
                debug!("Could not read window size: {}", e);
                return;
            }
        };
        let sx = out_w as f32 / self.width.max(1) as f32;
        let sy = out_h as f32 / self.height.max(1) as f32;
        if let Err(e) = self.canvas.set_scale(sx, sy) {
            debug!("Could not scale canvas: {}", e);
        }
    }

    fn outline(&self, center: Point2<f64>, radius: f64) -> Vec<Point2<f64>> {
        let state = self.state.current();
        (0..SEGMENTS)
            .map(|k| {
                let a = k as f64 / SEGMENTS as f64 * TAU;
                state.to_device(center + Vector2::new(a.cos(), a.sin()) * radius)
            })
            .collect()
    }

    fn on_canvas(&self, points: &[Point2<f64>], margin: f64) -> bool {
        let (w, h) = (self.width as f64, self.height as f64);
        points.iter().any(|p| {
            p.x >= -margin && p.x <= w + margin && p.y >= -margin && p.y <= h + margin
        })
    }

    fn polygon(&self, points: &[Point2<f64>], color: Color) {
        let vx: Vec<i16> = points.iter().map(|p| to_coord(p.x)).collect();
        let vy: Vec<i16> = points.iter().map(|p| to_coord(p.y)).collect();
        if let Err(e) = self.canvas.filled_polygon(&vx, &vy, color) {
            debug!("Polygon fill failed: {}", e);
        }
    }

    /// Rings of decreasing opacity grown `spread` px outward from `points`.
    fn glow(&self, points: &[Point2<f64>], offset: Vector2<f64>, spread: f64, rgb: Rgb, alpha: f64) {
        let n = points.len() as f64;
        let centroid = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords) / n;
        let layer_alpha = alpha / (GLOW_LAYERS + 1) as f64;
        for layer in (1..=GLOW_LAYERS).rev() {
            let grow = spread * layer as f64 / GLOW_LAYERS as f64;
            let ring: Vec<Point2<f64>> = points
                .iter()
                .map(|p| {
                    let out = p.coords - centroid;
                    let len = out.norm().max(1e-6);
                    Point2::from(p.coords + out / len * grow + offset)
                })
                .collect();
            if self.on_canvas(&ring, 0.) {
                self.polygon(&ring, to_color(rgb, layer_alpha));
            }
        }
    }
}

impl Surface for SdlSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.state.reset();
        self.fit_to_window();
        self.clear();
    }

    fn state(&self) -> &StateStack {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StateStack {
        &mut self.state
    }

    fn fill_circle(&mut self, center: Point2<f64>, radius: f64, color: Rgb) {
        let state = *self.state.current();
        let points = self.outline(center, radius);
        let soften = match state.filter {
            Filter::Soft { blur, .. } => blur,
            Filter::None => 0.,
        };

        let shadow = state.shadow;
        if shadow.is_visible() {
            self.glow(
                &points,
                shadow.offset,
                shadow.blur + soften,
                shadow.color,
                state.alpha,
            );
        }
        if self.on_canvas(&points, soften) {
            if soften > 0. {
                self.glow(&points, Vector2::zeros(), soften, color, state.alpha);
            }
            self.polygon(&points, to_color(color, state.alpha));
        }
    }

    fn fill_rect(&mut self, color: Rgba) {
        self.canvas.set_draw_color(to_color(color.rgb, color.a));
        if let Err(e) = self.canvas.fill_rect(None) {
            debug!("Fade fill failed: {}", e);
        }
    }

    fn clear(&mut self) {
        self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 255));
        self.canvas.clear();
    }

    fn present(&mut self) {
        self.canvas.present();
    }
}
