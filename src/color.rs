use log::debug;
use rand::Rng;

pub const FALLBACK_COLOR: &str = "rgba(131, 81, 242, 1)";
pub const FALLBACK_RGB: Rgb = Rgb::new(131, 81, 242);

const GOOEY_COLOR: &str = "--gooey-color";
const THEME_COLOR: &str = "--purple-medium";

const TRAIL_HIGHLIGHT_MIX: f64 = 0.45;
const BLOB_HIGHLIGHT_MIX: f64 = 0.28;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const BLACK: Rgb = Rgb::new(0, 0, 0);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    /// Moves every channel toward `target` by `t`, clamped to [0, 1].
    pub fn mix(self, target: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0., 1.);
        let channel = |from: u8, to: u8| {
            to_channel(from as f64 + (to as f64 - from as f64) * t)
        };
        Rgb {
            r: channel(self.r, target.r),
            g: channel(self.g, target.g),
            b: channel(self.b, target.b),
        }
    }

    pub fn mix_white(self, t: f64) -> Rgb {
        self.mix(WHITE, t)
    }

    pub fn mix_black(self, t: f64) -> Rgb {
        self.mix(BLACK, t)
    }

    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba { rgb: self, a }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f64,
}

fn to_channel(v: f64) -> u8 {
    v.round().clamp(0., 255.) as u8
}

/// Parses `rgb()`/`rgba()`, `#rgb` and `#rrggbb`. Anything else is rejected.
pub fn parse_color(text: &str) -> Option<Rgb> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(rgb) = parse_functional(text) {
        return Some(rgb);
    }
    parse_hex(text)
}

fn parse_functional(text: &str) -> Option<Rgb> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("rgb")?;
    let rest = &lower[start + 3..];
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let inner = rest.strip_prefix('(')?;
    let inner = &inner[..inner.find(')')?];

    let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    Some(Rgb::new(to_channel(r), to_channel(g), to_channel(b)))
}

fn parse_hex(text: &str) -> Option<Rgb> {
    let digits = text.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let mut it = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Rgb::new(it.next()??, it.next()??, it.next()??))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
            Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// Named color tokens exposed by the host page. Blank values count as unset.
pub trait Theme {
    /// Token set directly on the drawing surface's element.
    fn element_token(&self, name: &str) -> Option<String>;
    /// Token set on the document root.
    fn root_token(&self, name: &str) -> Option<String>;
}

/// A theme with nothing set: every lookup falls through to the fallback color.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTheme;

impl Theme for NoTheme {
    fn element_token(&self, _name: &str) -> Option<String> {
        None
    }

    fn root_token(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Fixed root-level tokens, used by hosts without a style system.
#[derive(Clone, Debug, Default)]
pub struct StaticTheme {
    pub gooey_color: Option<String>,
    pub theme_color: Option<String>,
}

impl Theme for StaticTheme {
    fn element_token(&self, _name: &str) -> Option<String> {
        None
    }

    fn root_token(&self, name: &str) -> Option<String> {
        match name {
            GOOEY_COLOR => self.gooey_color.clone(),
            THEME_COLOR => self.theme_color.clone(),
            _ => None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_fallback(chosen: Option<String>) -> Rgb {
    match chosen {
        Some(text) => parse_color(&text).unwrap_or_else(|| {
            debug!("Unparseable theme color {:?}, using fallback", text);
            FALLBACK_RGB
        }),
        None => FALLBACK_RGB,
    }
}

/// Base color for the trail: element override, root override, theme, fallback.
pub fn trail_base(theme: &dyn Theme) -> Rgb {
    let chosen = non_blank(theme.element_token(GOOEY_COLOR))
        .or_else(|| non_blank(theme.root_token(GOOEY_COLOR)))
        .or_else(|| non_blank(theme.root_token(THEME_COLOR)));
    parse_or_fallback(chosen)
}

/// Base color for slime bodies. Only root-level tokens are consulted.
pub fn slime_base(theme: &dyn Theme) -> Rgb {
    let chosen = non_blank(theme.root_token(GOOEY_COLOR))
        .or_else(|| non_blank(theme.root_token(THEME_COLOR)));
    parse_or_fallback(chosen)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub base: Rgb,
    pub highlight: Rgb,
}

impl Palette {
    pub fn read(theme: &dyn Theme) -> Palette {
        let base = trail_base(theme);
        Palette {
            base,
            highlight: base.mix_white(TRAIL_HIGHLIGHT_MIX),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::read(&NoTheme)
    }
}

/// Per-body color: a random brightness shift plus a small per-channel jitter.
/// Returns `(color, highlight)`.
pub fn vary<R: Rng>(base: Rgb, rng: &mut R) -> (Rgb, Rgb) {
    let brighten: f64 = rng.gen_range(-0.12..0.18);
    let shifted = if brighten >= 0. {
        mix_exact(base, WHITE, brighten)
    } else {
        mix_exact(base, BLACK, -brighten)
    };
    let mut jitter = || rng.gen_range(-10.0..10.0);
    let color = Rgb::new(
        to_channel(shifted[0] + jitter()),
        to_channel(shifted[1] + jitter()),
        to_channel(shifted[2] + jitter()),
    );
    (color, color.mix_white(BLOB_HIGHLIGHT_MIX))
}

// Unrounded mix, so the jitter applies before quantization.
fn mix_exact(a: Rgb, b: Rgb, t: f64) -> [f64; 3] {
    let t = t.clamp(0., 1.);
    let ch = |x: u8, y: u8| x as f64 + (y as f64 - x as f64) * t;
    [ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b)]
}
