//! RGBA color type used by stylesheet arithmetic.
//!
//! Channels are stored as floating values so that intermediate arithmetic
//! (`#102030 * 1.5`) keeps its precision. [`Color::fixed`] clamps every
//! channel to `0..=255` and floors it, which is done after every operation
//! that produces a color.
//!
//! ## Color spaces
//!
//! ```
//! use lessc::types::Color;
//!
//! let red = Color::rgb(255.0, 0.0, 0.0);
//! let (h, s, l) = red.to_hsl();
//! assert_eq!((h, s, l), (0.0, 100.0, 50.0));
//! assert_eq!(Color::from_hsl(h, s, l, None), red);
//! ```

use std::fmt;

/// An RGB color with optional alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel (0-255 once fixed).
    pub r: f64,
    /// Green channel (0-255 once fixed).
    pub g: f64,
    /// Blue channel (0-255 once fixed).
    pub b: f64,
    /// Alpha (0.0 = transparent, 1.0 = opaque). `None` renders as hex.
    pub a: Option<f64>,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: None }
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a: Some(a) }
    }

    /// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
    ///
    /// Short form digits are doubled, so `#abc` is `#aabbcc`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digits: Vec<u32> = hex.chars().map(|c| c.to_digit(16)).collect::<Option<_>>()?;

        match digits.as_slice() {
            [r, g, b] => Some(Self::rgb(
                f64::from(r * 17),
                f64::from(g * 17),
                f64::from(b * 17),
            )),
            [r1, r2, g1, g2, b1, b2] => Some(Self::rgb(
                f64::from(r1 * 16 + r2),
                f64::from(g1 * 16 + g2),
                f64::from(b1 * 16 + b2),
            )),
            _ => None,
        }
    }

    /// Clamps channels to `0..=255` and floors them; alpha is clamped to `0..=1`.
    pub fn fixed(self) -> Self {
        let channel = |c: f64| c.clamp(0.0, 255.0).floor();
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a.map(|a| a.clamp(0.0, 1.0)),
        }
    }

    /// Applies `f` to each pair of channels. Alpha is combined only when one
    /// side carries it, with the missing side counting as zero.
    pub fn zip_with(self, other: Color, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        let a = match (self.a, other.a) {
            (None, None) => None,
            (l, r) => Some(f(l.unwrap_or(0.0), r.unwrap_or(0.0))),
        };
        Self {
            r: f(self.r, other.r),
            g: f(self.g, other.g),
            b: f(self.b, other.b),
            a,
        }
    }

    /// Converts to HSL: hue in degrees (0-360), saturation and lightness in
    /// percent (0-100).
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.r / 255.0;
        let g = self.g / 255.0;
        let b = self.b / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let mut h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h /= 6.0;

        (h * 360.0, s * 100.0, l * 100.0)
    }

    /// Builds a color from HSL in the units returned by [`Color::to_hsl`].
    /// The result is already fixed.
    pub fn from_hsl(h: f64, s: f64, l: f64, a: Option<f64>) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = s.clamp(0.0, 100.0) / 100.0;
        let l = l.clamp(0.0, 100.0) / 100.0;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Self {
            r: (r * 255.0).round(),
            g: (g * 255.0).round(),
            b: (b * 255.0).round(),
            a,
        }
        .fixed()
    }

    /// Whether `#rrggbb` can be written as `#rgb`.
    pub fn is_shortenable(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (*c as u32) % 17 == 0)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.fixed();
        match c.a {
            Some(a) => write!(
                f,
                "rgba({},{},{},{})",
                c.r as u32,
                c.g as u32,
                c.b as u32,
                super::value::format_number(a)
            ),
            None => write!(f, "#{:02x}{:02x}{:02x}", c.r as u32, c.g as u32, c.b as u32),
        }
    }
}
