use crate::host::Metrics;

pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.;

/// Trail appearance and motion. Distances are CSS px unless noted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailConfig {
    /// Canvas resolution relative to CSS px, before device pixel ratio.
    pub scale: f64,
    pub trail_length: usize,
    pub radius_px: f64,
    pub blur_px: f64,
    pub inner_blur_ratio: f64,
    pub inner_radius_ratio: f64,
    /// Opacity of the black overwrite each frame. Lower lingers longer.
    pub fade_alpha: f64,
    pub follow_base: f64,
    pub follow_decay: f64,
    pub idle_wobble_px: f64,
    pub wobble_speed: f64,
    pub breathe_amount: f64,
    pub breathe_speed: f64,
    /// Distance the trail shapes are drawn off-canvas; only their shadows land.
    pub shadow_offset: f64,
}

impl Default for TrailConfig {
    fn default() -> Self {
        TrailConfig {
            scale: 0.1,
            trail_length: 26,
            radius_px: 14.,
            blur_px: 18.,
            inner_blur_ratio: 0.75,
            inner_radius_ratio: 0.6,
            fade_alpha: 0.06,
            follow_base: 0.5,
            follow_decay: 0.018,
            idle_wobble_px: 10.,
            wobble_speed: 1.25,
            breathe_amount: 0.06,
            breathe_speed: 1.6,
            shadow_offset: 3000.,
        }
    }
}

/// Slime body physics, population and rendering. Velocities are px per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlimeConfig {
    pub base_r: f64,
    pub max_bodies: usize,

    pub burst_min: usize,
    pub burst_max: usize,
    pub micro_r_min: f64,
    pub micro_r_max: f64,

    pub gravity: f64,
    pub air_damp: f64,
    pub float_amp: f64,
    pub float_speed: f64,

    pub margin_px: f64,
    pub wall_restitution: f64,
    pub ceiling_restitution: f64,
    pub floor_restitution: f64,
    pub floor_friction: f64,
    /// Vertical speed under which a floor bounce comes to rest.
    pub rest_speed: f64,

    pub cell_size: f64,
    pub collision_mix: f64,
    pub stickiness: f64,
    pub cohesion_px: f64,

    /// Upper bound on random pair draws per merge attempt.
    pub merge_trials_cap: usize,
    pub merge_trials_per_body: usize,
    /// Extra distance beyond contact at which two bodies may still merge.
    pub merge_slack_px: f64,

    pub max_stretch: f64,
    pub stretch_factor: f64,
    pub breath: f64,
    pub breath_speed: f64,
    pub blur_px: f64,
    pub base_alpha: f64,
}

impl Default for SlimeConfig {
    fn default() -> Self {
        SlimeConfig {
            base_r: 28.,
            max_bodies: 220,

            burst_min: 2,
            burst_max: 5,
            micro_r_min: 10.,
            micro_r_max: 18.,

            gravity: 0.085,
            air_damp: 0.996,
            float_amp: 1.8,
            float_speed: 0.028,

            margin_px: 10.,
            wall_restitution: 0.55,
            ceiling_restitution: 0.5,
            floor_restitution: 0.28,
            floor_friction: 0.94,
            rest_speed: 0.35,

            cell_size: 90.,
            collision_mix: 0.16,
            stickiness: 0.1,
            cohesion_px: 10.,

            merge_trials_cap: 140,
            merge_trials_per_body: 2,
            merge_slack_px: 6.,

            max_stretch: 0.36,
            stretch_factor: 0.035,
            breath: 0.05,
            breath_speed: 1.35,
            blur_px: 24.,
            base_alpha: 0.22,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectConfig {
    pub trail: TrailConfig,
    pub slime: SlimeConfig,
}

/// Resolution-dependent constants, recomputed on every resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub render_scale: f64,
    pub radius: f64,
    pub blur: f64,
    pub width: u32,
    pub height: u32,
}

impl Scale {
    pub fn compute(trail: &TrailConfig, metrics: &Metrics) -> Scale {
        let dpr = if metrics.device_pixel_ratio > 0. {
            metrics.device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.
        };
        let render_scale = trail.scale * dpr;
        Scale {
            render_scale,
            radius: trail.radius_px * render_scale,
            blur: trail.blur_px * render_scale,
            width: (metrics.viewport_width * render_scale).floor().max(0.) as u32,
            height: (metrics.viewport_height * render_scale).floor().max(0.) as u32,
        }
    }
}
