extern crate sdl2;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::EventPump;
use slimetrail::color::StaticTheme;
use slimetrail::logging::init_logging;
use slimetrail::render::sdl::SdlSurface;
use slimetrail::render::Surface;
use slimetrail::{Effect, EffectOptions, Frame, FrameSource, InputEvent, Metrics};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Pixels scrolled per wheel notch.
const WHEEL_STEP: f64 = 60.;

#[derive(Parser, Debug)]
#[command(name = "slimetrail")]
#[command(about = "Glowing pointer trail and click-spawned slime over a scrollable page")]
struct Cli {
    /// Window width in px
    #[arg(long, default_value_t = 1600)]
    width: u32,

    /// Window height in px
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Height of the simulated page; the mouse wheel scrolls through it
    #[arg(long, default_value_t = 2400.)]
    page_height: f64,

    /// Only clear the window each frame
    #[arg(long)]
    reduced_motion: bool,

    /// Seed for body sizes, colors and burst sprays
    #[arg(long)]
    seed: Option<u64>,

    /// Theme color, e.g. "#7c3aed" or "rgb(255, 120, 40)"
    #[arg(long)]
    color: Option<String>,

    /// Log every burst and merge
    #[arg(long)]
    verbose: bool,
}

/// Turns SDL events into effect input, one batch per refresh.
struct SdlFrames {
    event_pump: EventPump,
    start: Instant,
    metrics: Metrics,
}

impl SdlFrames {
    fn max_scroll(&self) -> f64 {
        (self.metrics.page_height() - self.metrics.viewport_height).max(0.)
    }

    fn translate(&mut self, event: Event, events: &mut Vec<InputEvent>) -> bool {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => return false,
            Event::MouseMotion { x, y, .. } => events.push(InputEvent::PointerMove {
                x: x as f64,
                y: y as f64,
            }),
            Event::FingerMotion { x, y, .. } | Event::FingerDown { x, y, .. } => {
                events.push(InputEvent::PointerMove {
                    x: x as f64 * self.metrics.viewport_width,
                    y: y as f64 * self.metrics.viewport_height,
                })
            }
            Event::MouseButtonDown {
                mouse_btn: MouseButton::Left,
                x,
                y,
                ..
            } => events.push(InputEvent::Click {
                x: x as f64,
                y: y as f64,
                interactive: false,
            }),
            Event::MouseWheel { y, .. } => {
                let scroll = (self.metrics.scroll_y - y as f64 * WHEEL_STEP).clamp(0., self.max_scroll());
                if scroll != self.metrics.scroll_y {
                    self.metrics.scroll_y = scroll;
                    events.push(InputEvent::Scroll {
                        x: self.metrics.scroll_x,
                        y: scroll,
                    });
                }
            }
            Event::Window {
                win_event: WindowEvent::SizeChanged(w, h),
                ..
            } => {
                self.metrics.viewport_width = w.max(0) as f64;
                self.metrics.viewport_height = h.max(0) as f64;
                self.metrics.document_width = self.metrics.viewport_width;
                self.metrics.scroll_y = self.metrics.scroll_y.min(self.max_scroll());
                events.push(InputEvent::Resize(self.metrics));
            }
            _ => {}
        }
        true
    }
}

impl FrameSource for SdlFrames {
    fn next_frame(&mut self) -> Option<Frame> {
        let mut events = vec![];
        let pending: Vec<Event> = self.event_pump.poll_iter().collect();
        for event in pending {
            if !self.translate(event, &mut events) {
                return None;
            }
        }
        Some(Frame {
            time: self.start.elapsed().as_secs_f64(),
            events,
        })
    }
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    })?;

    let sdl_context = sdl2::init().map_err(|e| anyhow!("SDL init failed: {}", e))?;
    let video_subsystem = sdl_context
        .video()
        .map_err(|e| anyhow!("SDL video init failed: {}", e))?;
    let window = video_subsystem
        .window("slimetrail", cli.width, cli.height)
        .position_centered()
        .resizable()
        .build()
        .context("could not open window")?;

    let surface: Option<Box<dyn Surface>> = match window.into_canvas().present_vsync().build() {
        Ok(canvas) => Some(Box::new(SdlSurface::new(canvas, cli.width, cli.height))),
        Err(e) => {
            error!("Could not create a canvas: {}", e);
            None
        }
    };

    let metrics = Metrics {
        document_height: cli.page_height,
        ..Metrics::window(cli.width as f64, cli.height as f64)
    };
    let theme = StaticTheme {
        gooey_color: cli.color,
        theme_color: None,
    };
    let options = EffectOptions {
        reduced_motion: cli.reduced_motion,
        seed: cli.seed.unwrap_or_else(default_seed),
        ..EffectOptions::default()
    };

    let mut effect = match Effect::new(surface, metrics, Box::new(theme), options) {
        Ok(effect) => effect,
        Err(e) => {
            warn!("Background effect disabled: {}", e);
            return Ok(());
        }
    };

    let mut frames = SdlFrames {
        event_pump: sdl_context
            .event_pump()
            .map_err(|e| anyhow!("no SDL event pump: {}", e))?,
        start: Instant::now(),
        metrics,
    };
    effect.run(&mut frames);
    info!("{} bodies alive at exit", effect.body_count());
    Ok(())
}
