use legion::system;
use nalgebra::{Point2, Vector2};

use super::{Filter, Screen, Shadow, Surface};
use crate::{
    blob::Blob,
    host::{FrameTime, Metrics},
    settings::{Scale, SlimeConfig},
    slime::SlimeWorld,
};

const SOFT_FILTER: Filter = Filter::Soft {
    blur: 1.5,
    contrast: 1.2,
    saturate: 1.1,
};
const HIGHLIGHT_SHIFT: f64 = -0.15;
const HIGHLIGHT_RADIUS: f64 = 0.6;
const HIGHLIGHT_ALPHA: f64 = 0.55;
const HIGHLIGHT_BLUR: f64 = 0.65;
/// How much of the stretch is given back as squash across the motion.
const SQUASH: f64 = 0.9;
const MIN_ROTATION_SPEED: f64 = 0.001;

/// Non-uniform scale and rotation that stretch a body along its velocity and
/// let it breathe while idle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deform {
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

pub fn deform(blob: &Blob, config: &SlimeConfig, time: f64) -> Deform {
    let speed = blob.speed();
    let stretch = (speed * config.stretch_factor).clamp(0., config.max_stretch);
    let breathe = 1. + config.breath * (time * config.breath_speed + blob.phase).sin();
    let angle = if speed > MIN_ROTATION_SPEED {
        blob.velocity.y.atan2(blob.velocity.x)
    } else {
        0.
    };
    Deform {
        angle,
        scale_x: breathe * (1. + stretch),
        scale_y: breathe / (1. + stretch * SQUASH),
    }
}

/// Whether a circle at `center` with `radius` touches a `width` x `height`
/// surface. Only rough bounding boxes are compared.
pub fn is_visible(center: Point2<f64>, radius: f64, width: f64, height: f64) -> bool {
    center.y + radius >= 0.
        && center.y - radius <= height
        && center.x + radius >= 0.
        && center.x - radius <= width
}

/// Draws every on-screen body. Returns how many were drawn.
pub fn draw_slime(
    surface: &mut dyn Surface,
    blobs: &[Blob],
    scroll: Vector2<f64>,
    scale: &Scale,
    config: &SlimeConfig,
    time: f64,
) -> usize {
    if blobs.is_empty() {
        return 0;
    }
    let (width, height) = surface.size();
    let (width, height) = (width as f64, height as f64);
    let blur = config.blur_px * scale.render_scale;
    let mut drawn = 0;

    surface.save();
    surface.set_shadow(Shadow::none());
    surface.set_filter(SOFT_FILTER);

    for blob in blobs {
        let screen = Point2::from((blob.position - scroll) * scale.render_scale);
        let rr = blob.radius * scale.render_scale;
        if !is_visible(screen, rr, width, height) {
            continue;
        }
        let shape = deform(blob, config, time);

        surface.save();
        surface.translate(screen.x, screen.y);
        surface.rotate(shape.angle);
        surface.scale(shape.scale_x, shape.scale_y);

        surface.set_shadow(Shadow::glow(blob.color, blur));
        surface.set_global_alpha(config.base_alpha * blob.alpha);
        surface.fill_circle(Point2::origin(), rr, blob.color);

        surface.set_shadow(Shadow::glow(blob.highlight, blur * HIGHLIGHT_BLUR));
        surface.set_global_alpha(config.base_alpha * HIGHLIGHT_ALPHA * blob.alpha);
        surface.fill_circle(
            Point2::new(rr * HIGHLIGHT_SHIFT, rr * HIGHLIGHT_SHIFT),
            rr * HIGHLIGHT_RADIUS,
            blob.highlight,
        );

        surface.restore();
        drawn += 1;
    }

    surface.restore();
    drawn
}

#[system]
pub fn slime_draw(
    #[resource] screen: &mut Screen,
    #[resource] slime: &SlimeWorld,
    #[resource] metrics: &Metrics,
    #[resource] scale: &Scale,
    #[resource] time: &FrameTime,
) {
    let scroll = Vector2::new(metrics.scroll_x, metrics.scroll_y);
    draw_slime(
        screen.surface.as_mut(),
        slime.blobs(),
        scroll,
        scale,
        slime.config(),
        time.seconds,
    );
    screen.surface.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::FALLBACK_RGB,
        render::record::{DrawOp, RecordingSurface},
        settings::TrailConfig,
    };
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn blob(x: f64, y: f64, vx: f64, vy: f64) -> Blob {
        let mut rng = Pcg64::seed_from_u64(4);
        let position = Vector2::new(x, y);
        Blob::new(1, position, Vector2::new(vx, vy), 20., FALLBACK_RGB, &mut rng)
    }

    fn scale() -> Scale {
        Scale::compute(&TrailConfig::default(), &Metrics::window(1000., 800.))
    }

    #[test]
    fn resting_body_only_breathes() {
        let config = SlimeConfig::default();
        let b = blob(0., 0., 0., 0.);
        let d = deform(&b, &config, 0.);
        assert_eq!(d.angle, 0.);
        assert!((d.scale_x - d.scale_y).abs() < 1e-12);
        assert!((d.scale_x - 1.).abs() <= config.breath + 1e-12);
    }

    #[test]
    fn fast_body_stretches_along_travel() {
        let config = SlimeConfig::default();
        let b = blob(0., 0., 0., 50.);
        let d = deform(&b, &config, 0.);
        assert!((d.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let breathe = 1. + config.breath * b.phase.sin();
        assert!((d.scale_x - breathe * (1. + config.max_stretch)).abs() < 1e-12);
        assert!(d.scale_y < d.scale_x);
    }

    #[test]
    fn offscreen_bodies_are_culled() {
        let config = SlimeConfig::default();
        let scale = scale();
        let mut surface = RecordingSurface::new(scale.width, scale.height);
        let log = surface.log();
        let blobs = vec![
            blob(500., 400., 0., 0.),
            blob(500., 3000., 0., 0.),
            blob(-100., 400., 0., 0.),
        ];
        let drawn = draw_slime(&mut surface, &blobs, Vector2::zeros(), &scale, &config, 0.);
        assert_eq!(drawn, 1);
        assert_eq!(log.circles(), 2);
        assert_eq!(surface.state().depth(), 0);
    }

    #[test]
    fn scroll_moves_bodies_into_view() {
        let config = SlimeConfig::default();
        let scale = scale();
        let mut surface = RecordingSurface::new(scale.width, scale.height);
        let log = surface.log();
        let blobs = vec![blob(500., 3000., 0., 0.)];
        let scroll = Vector2::new(0., 2600.);
        assert_eq!(draw_slime(&mut surface, &blobs, scroll, &scale, &config, 0.), 1);

        let center = log.ops()[0].device_center().unwrap();
        assert!((center.x - 50.).abs() < 1e-9);
        assert!((center.y - 40.).abs() < 1e-9);
    }

    #[test]
    fn bodies_use_real_blur_and_soft_filter() {
        let config = SlimeConfig::default();
        let scale = scale();
        let mut surface = RecordingSurface::new(scale.width, scale.height);
        let log = surface.log();
        let blobs = vec![blob(500., 400., 3., 0.)];
        draw_slime(&mut surface, &blobs, Vector2::zeros(), &scale, &config, 0.);

        for op in log.ops() {
            match op {
                DrawOp::Circle {
                    shadow,
                    filter,
                    alpha,
                    ..
                } => {
                    assert_eq!(shadow.offset, Vector2::zeros());
                    assert!(shadow.blur > 0.);
                    assert_eq!(filter, SOFT_FILTER);
                    assert!(alpha < config.base_alpha * 1.2);
                }
                other => panic!("unexpected op {:?}", other),
            }
        }
    }
}
