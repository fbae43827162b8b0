//! The drawing surface the effect renders onto, and the passes that draw the
//! trail and the slime bodies.
//!
//! [`Surface`] mirrors the subset of a 2D canvas context the effect needs:
//! a save/restore stack of transform, global alpha, filter and drop shadow,
//! filled circles and full-surface fills. Backends supply the primitives and
//! embed a [`StateStack`] for the rest.

pub mod record;
#[cfg(feature = "sdl")]
pub mod sdl;
pub mod slime;
pub mod trail;

use legion::system;
use nalgebra::{Matrix3, Point2, Vector2};

use crate::color::{Rgb, Rgba};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgb,
    pub blur: f64,
    /// Device-space offset; unaffected by the current transform.
    pub offset: Vector2<f64>,
}

impl Shadow {
    pub fn none() -> Shadow {
        Shadow {
            color: Rgb::new(0, 0, 0),
            blur: 0.,
            offset: Vector2::zeros(),
        }
    }

    pub fn glow(color: Rgb, blur: f64) -> Shadow {
        Shadow {
            color,
            blur,
            offset: Vector2::zeros(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.blur > 0. || self.offset != Vector2::zeros()
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Shadow::none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    None,
    /// Gaussian blur in device px followed by contrast and saturation gains.
    Soft {
        blur: f64,
        contrast: f64,
        saturate: f64,
    },
}

impl Default for Filter {
    fn default() -> Self {
        Filter::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub transform: Matrix3<f64>,
    pub alpha: f64,
    pub shadow: Shadow,
    pub filter: Filter,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            transform: Matrix3::identity(),
            alpha: 1.,
            shadow: Shadow::none(),
            filter: Filter::None,
        }
    }
}

impl DrawState {
    pub fn to_device(&self, point: Point2<f64>) -> Point2<f64> {
        self.transform.transform_point(&point)
    }
}

/// Current drawing state plus the states pushed by `save`.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced restores are ignored, as on a canvas.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn reset(&mut self) {
        self.current = DrawState::default();
        self.saved.clear();
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.current.transform *= Matrix3::new_translation(&Vector2::new(x, y));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.current.transform *= Matrix3::new_rotation(angle);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.current.transform *= Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy));
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.current.alpha = alpha.clamp(0., 1.);
    }

    pub fn set_shadow(&mut self, shadow: Shadow) {
        self.current.shadow = shadow;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.current.filter = filter;
    }
}

pub trait Surface {
    /// Pixel size of the backing store.
    fn size(&self) -> (u32, u32);
    /// Changes the backing store size. Clears content and drawing state.
    fn resize(&mut self, width: u32, height: u32);

    fn state(&self) -> &StateStack;
    fn state_mut(&mut self) -> &mut StateStack;

    /// Fills a circle in user space with the current state applied.
    fn fill_circle(&mut self, center: Point2<f64>, radius: f64, color: Rgb);
    /// Source-over fill of the whole surface, ignoring transform and shadow.
    fn fill_rect(&mut self, color: Rgba);
    fn clear(&mut self);
    /// Hands the finished frame to the display. No-op for offscreen surfaces.
    fn present(&mut self) {}

    fn save(&mut self) {
        self.state_mut().save();
    }

    fn restore(&mut self) {
        self.state_mut().restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state_mut().translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.state_mut().rotate(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state_mut().scale(sx, sy);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state_mut().set_alpha(alpha);
    }

    fn set_shadow(&mut self, shadow: Shadow) {
        self.state_mut().set_shadow(shadow);
    }

    fn set_filter(&mut self, filter: Filter) {
        self.state_mut().set_filter(filter);
    }
}

/// Owns the drawing surface for the frame schedule. Only thread-local systems
/// touch it.
pub struct Screen {
    pub surface: Box<dyn Surface>,
}

impl Screen {
    pub fn new(surface: Box<dyn Surface>) -> Screen {
        Screen { surface }
    }
}

#[system]
pub fn clear(#[resource] screen: &mut Screen) {
    screen.surface.clear();
    screen.surface.present();
}
