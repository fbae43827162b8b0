use crate::{blob::Blob, host::Metrics, settings::SlimeConfig};

/// Planes the bodies bounce against, in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub floor: f64,
    pub width: f64,
}

impl Bounds {
    pub fn of_page(metrics: &Metrics, config: &SlimeConfig) -> Bounds {
        Bounds {
            floor: metrics.page_height() - config.margin_px,
            width: metrics.page_width(),
        }
    }
}

pub fn advance_blobs(blobs: &mut [Blob], bounds: &Bounds, config: &SlimeConfig) {
    for blob in blobs.iter_mut() {
        advance_single_blob(blob, bounds, config);
    }
}

pub fn advance_single_blob(blob: &mut Blob, bounds: &Bounds, config: &SlimeConfig) {
    blob.float_phase += config.float_speed;
    let float_y = blob.float_phase.sin() * config.float_amp;

    blob.velocity.y += config.gravity;
    blob.velocity *= config.air_damp;

    blob.position.x += blob.velocity.x;
    blob.position.y += blob.velocity.y + float_y;

    // Floor.
    if blob.position.y + blob.radius > bounds.floor {
        blob.position.y = bounds.floor - blob.radius;
        blob.velocity.y *= -config.floor_restitution;
        blob.velocity.x *= config.floor_friction;
        if blob.velocity.y.abs() < config.rest_speed {
            blob.velocity.y = 0.;
        }
    }

    // Ceiling.
    if blob.position.y - blob.radius < 0. {
        blob.position.y = blob.radius;
        blob.velocity.y *= -config.ceiling_restitution;
    }

    // Walls.
    if blob.position.x - blob.radius < 0. {
        blob.position.x = blob.radius;
        blob.velocity.x *= -config.wall_restitution;
    } else if blob.position.x + blob.radius > bounds.width {
        blob.position.x = bounds.width - blob.radius;
        blob.velocity.x *= -config.wall_restitution;
    }
}
