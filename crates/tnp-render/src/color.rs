use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgb_f(r: f64, g: f64, b: f64) -> Self {
        let c = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(c(r), c(g), c(b))
    }

    /// Parse `#RRGGBB` (leading `#` optional). `None` on malformed input.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// --- ROOT color indices ---

pub const K_WHITE: i32 = 0;
pub const K_BLACK: i32 = 1;
pub const K_GRAY: i32 = 920;
pub const K_ORANGE: i32 = 800;
pub const K_SPRING: i32 = 820;
pub const K_TEAL: i32 = 840;
pub const K_AZURE: i32 = 860;
pub const K_VIOLET: i32 = 880;
pub const K_PINK: i32 = 900;
pub const K_RED: i32 = 632;
pub const K_GREEN: i32 = 416;
pub const K_BLUE: i32 = 600;
pub const K_YELLOW: i32 = 400;
pub const K_MAGENTA: i32 = 616;
pub const K_CYAN: i32 = 432;

const BASIC: [(f64, f64, f64); 10] = [
    (1.0, 1.0, 1.0),
    (0.0, 0.0, 0.0),
    (1.0, 0.0, 0.0),
    (0.0, 1.0, 0.0),
    (0.0, 0.0, 1.0),
    (1.0, 1.0, 0.0),
    (1.0, 0.0, 1.0),
    (0.0, 1.0, 1.0),
    (0.35, 0.83, 0.33),
    (0.35, 0.33, 0.85),
];

/// (bright, dim) channel pairs of the 15 circle shades, `base-10 ..= base+4`.
const CIRCLE_SHADES: [(u8, u8); 15] = [
    (255, 204),
    (255, 153),
    (204, 153),
    (255, 102),
    (204, 102),
    (153, 102),
    (255, 51),
    (204, 51),
    (153, 51),
    (102, 51),
    (255, 0),
    (204, 0),
    (153, 0),
    (102, 0),
    (51, 0),
];

/// Primary wheel colors: base index and which channels are "bright".
const CIRCLES: [(i32, [bool; 3]); 6] = [
    (K_RED, [true, false, false]),
    (K_GREEN, [false, true, false]),
    (K_BLUE, [false, false, true]),
    (K_YELLOW, [true, true, false]),
    (K_MAGENTA, [true, false, true]),
    (K_CYAN, [false, true, true]),
];

/// Secondary wheel colors (`base-9 ..= base+10`).
const RECTANGLES: [(i32, (u8, u8, u8)); 6] = [
    (K_ORANGE, (255, 204, 0)),
    (K_SPRING, (204, 255, 0)),
    (K_TEAL, (0, 255, 204)),
    (K_AZURE, (0, 153, 255)),
    (K_VIOLET, (204, 0, 255)),
    (K_PINK, (255, 0, 204)),
];

/// Map a ROOT color index (`kRed+2` written as `634`, ...) to RGB.
///
/// Unknown indices resolve to black, which is what ROOT draws for an
/// undefined color.
pub fn root_color(index: i32) -> Color {
    match index {
        0..=9 => {
            let (r, g, b) = BASIC[index as usize];
            Color::rgb_f(r, g, b)
        }
        10 => Color::rgb_f(0.999, 0.999, 0.999),
        11 => Color::rgb_f(0.754, 0.715, 0.676),
        12..=19 => {
            let level = 0.1 * (index - 10) as f64;
            Color::rgb_f(level, level, level)
        }
        _ => wheel_color(index).unwrap_or(Color::BLACK),
    }
}

fn wheel_color(index: i32) -> Option<Color> {
    for &(base, bright) in &CIRCLES {
        let offset = index - base;
        if (-10..=4).contains(&offset) {
            let (hi, lo) = CIRCLE_SHADES[(offset + 10) as usize];
            let ch = |on: bool| if on { hi } else { lo };
            return Some(Color::rgb(ch(bright[0]), ch(bright[1]), ch(bright[2])));
        }
    }
    for &(base, (r, g, b)) in &RECTANGLES {
        let offset = index - base;
        if (-9..=10).contains(&offset) {
            let base_color = Color::rgb(r, g, b);
            return Some(if offset < 0 {
                Color::lerp(base_color, Color::WHITE, -offset as f64 / 10.0)
            } else {
                Color::lerp(base_color, Color::BLACK, offset as f64 / 12.0)
            });
        }
    }
    let offset = index - K_GRAY;
    if (0..=3).contains(&offset) {
        let level = 204 - 51 * offset as u8;
        return Some(Color::rgb(level, level, level));
    }
    None
}

/// Resolve a ROOT color name with optional offset (`kRed`, `kAzure-4`,
/// `kGray+2`) to its index.
pub fn named_index(name: &str) -> Option<i32> {
    let name = name.trim();
    let split = name.find(['+', '-']).unwrap_or(name.len());
    let (base, offset) = name.split_at(split);
    let base = match base.trim() {
        "kWhite" => K_WHITE,
        "kBlack" => K_BLACK,
        "kGray" => K_GRAY,
        "kRed" => K_RED,
        "kGreen" => K_GREEN,
        "kBlue" => K_BLUE,
        "kYellow" => K_YELLOW,
        "kMagenta" => K_MAGENTA,
        "kCyan" => K_CYAN,
        "kOrange" => K_ORANGE,
        "kSpring" => K_SPRING,
        "kTeal" => K_TEAL,
        "kAzure" => K_AZURE,
        "kViolet" => K_VIOLET,
        "kPink" => K_PINK,
        _ => return None,
    };
    let offset = match offset.replace(' ', "").as_str() {
        "" => 0,
        o => o.strip_prefix('+').unwrap_or(o).parse::<i32>().ok()?,
    };
    Some(base + offset)
}

// --- kBird palette (ROOT default for colz) ---

const BIRD_RED: [f64; 9] = [0.2082, 0.0592, 0.0780, 0.0232, 0.1802, 0.5301, 0.8186, 0.9956, 0.9764];
const BIRD_GREEN: [f64; 9] =
    [0.1664, 0.3599, 0.5041, 0.6419, 0.7178, 0.7492, 0.7328, 0.7862, 0.9832];
const BIRD_BLUE: [f64; 9] = [0.5293, 0.8684, 0.8385, 0.7914, 0.6425, 0.4662, 0.3499, 0.1968, 0.0539];

/// kBird color at `t` in `[0, 1]` (clamped).
pub fn bird(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (BIRD_RED.len() - 1) as f64;
    let i = (pos.floor() as usize).min(BIRD_RED.len() - 2);
    let f = pos - i as f64;
    let at = |c: &[f64; 9]| c[i] * (1.0 - f) + c[i + 1] * f;
    Color::rgb_f(at(&BIRD_RED), at(&BIRD_GREEN), at(&BIRD_BLUE))
}
