//! What the effect needs from the page hosting it: viewport and document
//! metrics, input events, and a once-per-refresh frame signal.

use std::collections::VecDeque;

/// Viewport and document geometry in CSS px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub device_pixel_ratio: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_width: f64,
    pub document_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Metrics {
    /// A page exactly the size of its viewport, unscrolled.
    pub fn window(width: f64, height: f64) -> Metrics {
        Metrics {
            device_pixel_ratio: 1.,
            viewport_width: width,
            viewport_height: height,
            document_width: width,
            document_height: height,
            scroll_x: 0.,
            scroll_y: 0.,
        }
    }

    /// Bottom of the page. Never above the bottom of the viewport.
    pub fn page_height(&self) -> f64 {
        self.document_height.max(self.viewport_height)
    }

    pub fn page_width(&self) -> f64 {
        self.document_width.max(self.viewport_width)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics::window(1280., 720.)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Mouse move or first touch point, client coordinates.
    PointerMove { x: f64, y: f64 },
    /// `interactive` is set when the click landed on a button, link, form
    /// control, label or dialog. Those clicks spawn nothing.
    Click { x: f64, y: f64, interactive: bool },
    Resize(Metrics),
    Scroll { x: f64, y: f64 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Seconds since an arbitrary origin; drives idle animation only.
    pub time: f64,
    /// Input received since the previous frame, in arrival order.
    pub events: Vec<InputEvent>,
}

/// Display refresh signal. `None` ends the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Replays a fixed list of frames. Useful for headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedFrames {
    frames: VecDeque<Frame>,
}

impl ScriptedFrames {
    pub fn new<I: IntoIterator<Item = Frame>>(frames: I) -> ScriptedFrames {
        ScriptedFrames {
            frames: frames.into_iter().collect(),
        }
    }

    /// `count` empty frames at 60 Hz starting from `start`.
    pub fn idle(start: f64, count: usize) -> ScriptedFrames {
        ScriptedFrames::new((0..count).map(|i| Frame {
            time: start + i as f64 / 60.,
            events: vec![],
        }))
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }
}

/// Timestamp of the frame being drawn, shared with the frame schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub seconds: f64,
}
