use legion::{Resources, Schedule, World};
use log::{debug, info};
use nalgebra::Vector2;

use crate::{
    blob::Blob,
    color::{self, Palette, Theme},
    error::{EffectError, Result},
    host::{FrameSource, FrameTime, InputEvent, Metrics},
    render::{self, Screen, Surface},
    settings::{EffectConfig, Scale, TrailConfig},
    slime::{self, SlimeWorld},
    trail::{self, Trail},
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectOptions {
    pub config: EffectConfig,
    /// Read once at startup. When set every frame just clears the surface.
    pub reduced_motion: bool,
    pub seed: u64,
}

/// The whole background effect: shared state, the drawing surface and the
/// per-frame schedule.
pub struct Effect {
    world: World,
    resources: Resources,
    schedule: Schedule,
    theme: Box<dyn Theme>,
    trail_config: TrailConfig,
    reduced_motion: bool,
}

fn build_schedule(reduced_motion: bool) -> Schedule {
    if reduced_motion {
        return Schedule::builder()
            .add_thread_local(render::clear_system())
            .build();
    }
    Schedule::builder()
        .add_system(trail::trail_update_system())
        .add_thread_local(render::trail::fade_screen_system())
        .add_thread_local(render::trail::trail_draw_system())
        .add_system(slime::slime_step_system())
        .add_thread_local(render::slime::slime_draw_system())
        .build()
}

impl Effect {
    /// Sets up the effect on `surface`. Without a surface the effect cannot
    /// run at all; callers are expected to log the error and carry on.
    pub fn new(
        surface: Option<Box<dyn Surface>>,
        metrics: Metrics,
        theme: Box<dyn Theme>,
        options: EffectOptions,
    ) -> Result<Effect> {
        let mut surface = surface.ok_or(EffectError::MissingSurface)?;
        let EffectConfig { trail, slime } = options.config;

        // A zero-sized surface is kept; the next resize gives it pixels.
        let scale = Scale::compute(&trail, &metrics);
        surface.resize(scale.width, scale.height);

        let mut slime_world = SlimeWorld::new(slime, options.seed);
        slime_world.set_base_color(color::slime_base(theme.as_ref()));

        let mut resources = Resources::default();
        resources.insert(trail);
        resources.insert(scale);
        resources.insert(metrics);
        resources.insert(Palette::read(theme.as_ref()));
        resources.insert(Trail::new(trail.trail_length));
        resources.insert(slime_world);
        resources.insert(FrameTime::default());
        resources.insert(Screen::new(surface));

        info!(
            "Background effect ready: {}x{} canvas, render scale {:.2}, reduced motion {}",
            scale.width, scale.height, scale.render_scale, options.reduced_motion
        );

        Ok(Effect {
            world: World::default(),
            resources,
            schedule: build_schedule(options.reduced_motion),
            theme,
            trail_config: trail,
            reduced_motion: options.reduced_motion,
        })
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                let render_scale = self.scale().render_scale;
                if let Some(mut trail) = self.resources.get_mut::<Trail>() {
                    trail.set_pointer(x, y, render_scale);
                }
            }
            InputEvent::Click { interactive: true, .. } => {}
            InputEvent::Click { .. } if self.reduced_motion => {}
            InputEvent::Click { x, y, .. } => {
                let metrics = self.metrics();
                let scroll = Vector2::new(metrics.scroll_x, metrics.scroll_y);
                if let Some(mut slime) = self.resources.get_mut::<SlimeWorld>() {
                    slime.spawn_burst(x, y, scroll);
                }
            }
            InputEvent::Scroll { x, y } => {
                if let Some(mut metrics) = self.resources.get_mut::<Metrics>() {
                    metrics.scroll_x = x;
                    metrics.scroll_y = y;
                }
            }
            InputEvent::Resize(metrics) => self.resize(metrics),
        }
    }

    fn resize(&mut self, metrics: Metrics) {
        let old = self.scale();
        let scale = Scale::compute(&self.trail_config, &metrics);

        self.resources.insert(metrics);
        self.resources.insert(scale);
        if let Some(mut screen) = self.resources.get_mut::<Screen>() {
            screen.surface.resize(scale.width, scale.height);
        }
        if old.render_scale > 0. && scale.render_scale != old.render_scale {
            if let Some(mut trail) = self.resources.get_mut::<Trail>() {
                trail.rescale(scale.render_scale / old.render_scale);
            }
        }
        self.reload_theme();
        info!(
            "Resized to {}x{} canvas, render scale {:.2}",
            scale.width, scale.height, scale.render_scale
        );
    }

    /// Re-reads theme colors for the trail and for bodies spawned from now on.
    pub fn reload_theme(&mut self) {
        let palette = Palette::read(self.theme.as_ref());
        let base = color::slime_base(self.theme.as_ref());
        debug!("Theme colors: trail {:?}, slime {:?}", palette, base);
        self.resources.insert(palette);
        if let Some(mut slime) = self.resources.get_mut::<SlimeWorld>() {
            slime.set_base_color(base);
        }
    }

    /// Runs one frame: trail, fade, trail draw, physics, slime draw.
    pub fn step(&mut self, time: f64) {
        self.resources.insert(FrameTime { seconds: time });
        self.schedule.execute(&mut self.world, &mut self.resources);
    }

    /// Applies each frame's input then steps, until the source runs dry.
    /// Returns the number of frames run.
    pub fn run<F: FrameSource + ?Sized>(&mut self, frames: &mut F) -> u64 {
        let mut count = 0;
        while let Some(frame) = frames.next_frame() {
            for event in frame.events {
                self.handle(event);
            }
            self.step(frame.time);
            count += 1;
        }
        info!("Frame source closed after {} frames", count);
        count
    }

    pub fn scale(&self) -> Scale {
        self.resources
            .get::<Scale>()
            .map(|s| *s)
            .unwrap_or_else(|| Scale::compute(&self.trail_config, &self.metrics()))
    }

    pub fn metrics(&self) -> Metrics {
        self.resources.get::<Metrics>().map(|m| *m).unwrap_or_default()
    }

    pub fn trail_config(&self) -> TrailConfig {
        self.trail_config
    }

    pub fn palette(&self) -> Palette {
        self.resources.get::<Palette>().map(|p| *p).unwrap_or_default()
    }

    pub fn trail(&self) -> Trail {
        self.resources
            .get::<Trail>()
            .map(|t| (*t).clone())
            .unwrap_or_else(|| Trail::new(0))
    }

    pub fn body_count(&self) -> usize {
        self.resources.get::<SlimeWorld>().map_or(0, |s| s.len())
    }

    pub fn bodies(&self) -> Vec<Blob> {
        self.resources
            .get::<SlimeWorld>()
            .map(|s| s.blobs().to_vec())
            .unwrap_or_default()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.resources
            .get::<Screen>()
            .map_or((0, 0), |s| s.surface.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::NoTheme,
        host::{Frame, ScriptedFrames},
        render::record::{DrawOp, RecordingSurface},
    };

    fn effect(reduced_motion: bool) -> (Effect, crate::render::record::DrawLog) {
        let surface = RecordingSurface::new(1, 1);
        let log = surface.log();
        let options = EffectOptions {
            reduced_motion,
            seed: 99,
            ..EffectOptions::default()
        };
        let effect = Effect::new(
            Some(Box::new(surface)),
            Metrics::window(1000., 800.),
            Box::new(NoTheme),
            options,
        )
        .unwrap();
        log.take();
        (effect, log)
    }

    #[test]
    fn missing_surface_disables_the_effect() {
        let result = Effect::new(
            None,
            Metrics::default(),
            Box::new(NoTheme),
            EffectOptions::default(),
        );
        assert_eq!(result.err(), Some(EffectError::MissingSurface));
    }

    #[test]
    fn narrow_viewport_starts_and_draws_after_resize() {
        let surface = RecordingSurface::new(1, 1);
        let log = surface.log();
        let mut effect = Effect::new(
            Some(Box::new(surface)),
            Metrics::window(9., 600.),
            Box::new(NoTheme),
            EffectOptions::default(),
        )
        .unwrap();
        assert_eq!(effect.surface_size(), (0, 60));

        effect.handle(InputEvent::Resize(Metrics::window(1000., 800.)));
        assert_eq!(effect.surface_size(), (100, 80));
        effect.handle(InputEvent::Click {
            x: 500.,
            y: 300.,
            interactive: false,
        });
        log.take();
        effect.step(0.);
        assert!(effect.body_count() > 0);
        assert_eq!(log.circles(), 2 * effect.body_count());
    }

    #[test]
    fn construction_sizes_the_surface() {
        let (effect, _) = effect(false);
        assert_eq!(effect.surface_size(), (100, 80));
    }

    #[test]
    fn frame_runs_stages_in_order() {
        let (mut effect, log) = effect(false);
        effect.handle(InputEvent::PointerMove { x: 500., y: 400. });
        effect.handle(InputEvent::Click {
            x: 500.,
            y: 300.,
            interactive: false,
        });
        effect.step(0.5);

        let ops = log.take();
        assert_eq!(ops.first(), Some(&DrawOp::Fill(color::BLACK.with_alpha(0.06))));
        assert_eq!(ops.last(), Some(&DrawOp::Present));

        let trail_circles = 2 * effect.trail_config().trail_length;
        let circles: Vec<&DrawOp> = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .collect();
        assert_eq!(circles.len(), trail_circles + 2 * effect.body_count());
        // Trail circles come first and use the off-canvas shadow trick.
        assert!(circles[..trail_circles]
            .iter()
            .all(|op| op.device_center().unwrap().x < 0.));
        assert!(circles[trail_circles..]
            .iter()
            .all(|op| op.device_center().unwrap().x > 0.));
    }

    #[test]
    fn reduced_motion_only_clears() {
        let (mut effect, log) = effect(true);
        assert!(effect.is_reduced_motion());
        effect.handle(InputEvent::PointerMove { x: 10., y: 10. });
        effect.handle(InputEvent::Click {
            x: 10.,
            y: 10.,
            interactive: false,
        });
        assert_eq!(effect.body_count(), 0);
        let mut frames = ScriptedFrames::idle(0., 3);
        assert_eq!(effect.run(&mut frames), 3);
        assert_eq!(
            log.ops(),
            vec![
                DrawOp::Clear,
                DrawOp::Present,
                DrawOp::Clear,
                DrawOp::Present,
                DrawOp::Clear,
                DrawOp::Present
            ]
        );
    }

    #[test]
    fn interactive_clicks_spawn_nothing() {
        let (mut effect, _) = effect(false);
        effect.handle(InputEvent::Click {
            x: 100.,
            y: 100.,
            interactive: true,
        });
        assert_eq!(effect.body_count(), 0);
    }

    #[test]
    fn resize_recomputes_surface_and_trail() {
        let (mut effect, log) = effect(false);
        effect.handle(InputEvent::PointerMove { x: 500., y: 400. });
        effect.handle(InputEvent::Resize(Metrics {
            device_pixel_ratio: 2.,
            ..Metrics::window(600., 400.)
        }));
        assert_eq!(effect.surface_size(), (120, 80));
        assert_eq!(log.ops(), vec![DrawOp::Resize(120, 80)]);
        let head = effect.trail().target(0).unwrap();
        assert!((head.x - 100.).abs() < 1e-9);
        assert!((head.y - 80.).abs() < 1e-9);
    }

    #[test]
    fn scroll_offsets_new_bursts() {
        let (mut effect, _) = effect(false);
        let mut frames = ScriptedFrames::new(vec![Frame {
            time: 0.,
            events: vec![
                InputEvent::Scroll { x: 0., y: 500. },
                InputEvent::Click {
                    x: 200.,
                    y: 100.,
                    interactive: false,
                },
            ],
        }]);
        effect.run(&mut frames);
        let main = effect.bodies()[0];
        assert!((main.position.x - 200.).abs() < 5.);
        assert!(main.position.y > 500.);
    }
}
