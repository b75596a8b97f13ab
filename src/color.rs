//! Color helpers.
//!
//! Colors are plain [`Vec3`] RGB triples with channels in `0.0..=1.0`, the
//! same representation the attribute buffers carry. [`HexColor`] is the
//! serializable form used by the parameter set (`"#00aaff"`).

use crate::error::ParamError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB color that serializes as a `#rrggbb` string.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Vec3);

impl HexColor {
    /// Build from 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        HexColor(Vec3::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ))
    }

    /// Parse `#rrggbb` or the short `#rgb` form. The leading `#` is optional.
    pub fn parse(s: &str) -> Result<Self, ParamError> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || ParamError::InvalidColor(s.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::from_rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::from_rgb8(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// The RGB triple.
    #[inline]
    pub fn rgb(&self) -> Vec3 {
        self.0
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.0.x),
            to_byte(self.0.y),
            to_byte(self.0.z)
        )
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for HexColor {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_hex()
    }
}

impl From<HexColor> for Vec3 {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

/// Convert RGB to HSL. Hue is in `0.0..1.0`.
pub fn rgb_to_hsl(rgb: Vec3) -> Vec3 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let lightness = (min + max) / 2.0;

    if max == min {
        return Vec3::new(0.0, 0.0, lightness);
    }

    let delta = max - min;
    let saturation = if lightness <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let hue = if max == rgb.x {
        (rgb.y - rgb.z) / delta + if rgb.y < rgb.z { 6.0 } else { 0.0 }
    } else if max == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };

    Vec3::new(hue / 6.0, saturation, lightness)
}

/// Convert HSL back to RGB. Hue wraps, saturation and lightness clamp.
pub fn hsl_to_rgb(hsl: Vec3) -> Vec3 {
    let h = hsl.x.rem_euclid(1.0);
    let s = hsl.y.clamp(0.0, 1.0);
    let l = hsl.z.clamp(0.0, 1.0);

    if s == 0.0 {
        return Vec3::splat(l);
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    Vec3::new(
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Shift a color in HSL space.
///
/// Hue offsets wrap around the color wheel; saturation and lightness offsets
/// saturate at the ends of their range.
pub fn offset_hsl(rgb: Vec3, dh: f32, ds: f32, dl: f32) -> Vec3 {
    let hsl = rgb_to_hsl(rgb);
    hsl_to_rgb(hsl + Vec3::new(dh, ds, dl))
}
