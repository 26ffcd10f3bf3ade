/// An RGB24 color, one byte per channel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Rgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb24 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const BLACK: Rgb24 = Rgb24::new(0, 0, 0);

/// Lowest representable world Y, and the height sentinel for void columns.
pub const MIN_Y: i32 = -64;

/// Highest representable world Y.
pub const MAX_Y: i32 = 319;

/// Multiplicative brightness factor applied per §4.2: deeper blocks darken,
/// higher terrain brightens, identically across channels (grayscale
/// modulation).
pub fn height_shade_factor(abs_y: i32) -> f32 {
    0.7 + ((abs_y + 64) as f32 / 384.0) * 0.6
}

/// Applies [`height_shade_factor`] to `color`, clamping each channel to
/// `0..=255`.
pub fn shade(color: Rgb24, abs_y: i32) -> Rgb24 {
    let f = height_shade_factor(abs_y);
    let ch = |c: u8| ((c as f32) * f).round().clamp(0.0, 255.0) as u8;
    Rgb24::new(ch(color.r), ch(color.g), ch(color.b))
}
