use slimetrail::color::{NoTheme, StaticTheme, BLACK};
use slimetrail::render::record::{DrawLog, DrawOp, RecordingSurface};
use slimetrail::{Effect, EffectOptions, Frame, InputEvent, Metrics, ScriptedFrames};

fn page() -> Metrics {
    Metrics {
        document_height: 2400.,
        ..Metrics::window(1200., 800.)
    }
}

fn start(seed: u64, theme: StaticTheme) -> (Effect, DrawLog) {
    let surface = RecordingSurface::new(1, 1);
    let log = surface.log();
    let options = EffectOptions {
        seed,
        ..EffectOptions::default()
    };
    let effect = Effect::new(Some(Box::new(surface)), page(), Box::new(theme), options)
        .expect("effect");
    log.take();
    (effect, log)
}

fn click(x: f64, y: f64) -> InputEvent {
    InputEvent::Click {
        x,
        y,
        interactive: false,
    }
}

/// A click every frame, walking across the viewport.
fn click_storm(frames: usize) -> ScriptedFrames {
    ScriptedFrames::new((0..frames).map(|i| Frame {
        time: i as f64 / 60.,
        events: vec![click(40. + (i * 37 % 1100) as f64, 60. + (i * 53 % 680) as f64)],
    }))
}

#[test]
fn idle_frame_only_fades_and_presents() {
    let (mut effect, log) = start(1, StaticTheme::default());
    effect.step(0.);
    assert_eq!(
        log.ops(),
        vec![DrawOp::Fill(BLACK.with_alpha(0.06)), DrawOp::Present]
    );
}

#[test]
fn population_never_exceeds_the_cap() {
    let (mut effect, _) = start(7, StaticTheme::default());
    let mut frames = click_storm(120);
    while let Some(frame) = slimetrail::FrameSource::next_frame(&mut frames) {
        for event in frame.events {
            effect.handle(event);
        }
        assert!(effect.body_count() <= 220);
        effect.step(frame.time);
    }
    assert!(effect.body_count() > 0);
}

#[test]
fn same_seed_same_slime() {
    let (mut a, _) = start(1234, StaticTheme::default());
    let (mut b, _) = start(1234, StaticTheme::default());
    a.run(&mut click_storm(40));
    b.run(&mut click_storm(40));
    assert_eq!(a.bodies(), b.bodies());
}

#[test]
fn bodies_stay_inside_the_page() {
    let (mut effect, _) = start(3, StaticTheme::default());
    effect.run(&mut click_storm(30));
    effect.run(&mut ScriptedFrames::idle(1., 600));

    let page = page();
    // Contact resolution runs after the bounds check, so allow a little
    // squeeze past the edges but never a body leaving the page.
    for body in effect.bodies() {
        assert!(body.position.x > 0. && body.position.x < page.page_width());
        assert!(body.position.y > 0. && body.position.y < page.page_height());
    }
}

#[test]
fn theme_color_tints_new_bodies() {
    let theme = StaticTheme {
        gooey_color: Some("#ff0000".to_string()),
        theme_color: None,
    };
    let (mut effect, _) = start(5, theme);
    effect.handle(click(300., 300.));
    for body in effect.bodies() {
        assert!(body.color.r as i32 > body.color.g as i32 + 100);
        assert!(body.color.r as i32 > body.color.b as i32 + 100);
    }
}

#[test]
fn pointer_trail_follows_after_first_move() {
    let (mut effect, log) = start(2, StaticTheme::default());
    effect.run(&mut ScriptedFrames::new(vec![Frame {
        time: 0.,
        events: vec![InputEvent::PointerMove { x: 600., y: 400. }],
    }]));
    let trail_len = effect.trail_config().trail_length;
    assert_eq!(log.circles(), 2 * trail_len);

    let trail = effect.trail();
    let head = trail.target(0).expect("seeded");
    let scale = effect.scale().render_scale;
    assert!((head.x - 600. * scale).abs() < 1e-9);
    assert!((head.y - 400. * scale).abs() < 1e-9);
}

#[test]
fn missing_surface_is_reported_not_fatal() {
    let result = Effect::new(None, page(), Box::new(NoTheme), EffectOptions::default());
    assert!(result.is_err());
}
