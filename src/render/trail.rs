use legion::system;
use nalgebra::{Point2, Vector2};

use super::{Screen, Shadow, Surface};
use crate::{
    color::{Palette, BLACK},
    host::FrameTime,
    settings::{Scale, TrailConfig},
    trail::Trail,
};

/// Partially overwrites the previous frame with black so older strokes linger
/// and fade.
pub fn fade(surface: &mut dyn Surface, config: &TrailConfig) {
    surface.fill_rect(BLACK.with_alpha(config.fade_alpha));
}

/// Draws an outer and an inner glow per seeded slot. Each circle is placed
/// `shadow_offset` off-canvas and its shadow is shifted back on, so only the
/// blurred projection is visible.
pub fn draw_trail(
    surface: &mut dyn Surface,
    trail: &Trail,
    palette: &Palette,
    config: &TrailConfig,
    scale: &Scale,
    time: f64,
) {
    let offset = Vector2::new(config.shadow_offset, config.shadow_offset);
    let shadow = |color, blur| Shadow {
        color,
        blur,
        offset,
    };

    for (position, radius) in trail.sprites(config, scale, time) {
        let hidden = Point2::from(position - offset);

        surface.set_shadow(shadow(palette.base, scale.blur));
        surface.fill_circle(hidden, radius, palette.base);

        surface.set_shadow(shadow(palette.highlight, scale.blur * config.inner_blur_ratio));
        surface.fill_circle(hidden, radius * config.inner_radius_ratio, palette.highlight);
    }
    surface.set_shadow(Shadow::none());
}

#[system]
pub fn fade_screen(#[resource] screen: &mut Screen, #[resource] config: &TrailConfig) {
    fade(screen.surface.as_mut(), config);
}

#[system]
pub fn trail_draw(
    #[resource] screen: &mut Screen,
    #[resource] trail: &Trail,
    #[resource] palette: &Palette,
    #[resource] config: &TrailConfig,
    #[resource] scale: &Scale,
    #[resource] time: &FrameTime,
) {
    draw_trail(
        screen.surface.as_mut(),
        trail,
        palette,
        config,
        scale,
        time.seconds,
    );
}
