//! Working-colorspace color vectors and the RMSE distance metric.

use core::fmt;

use crate::error::KMeansError;

/// A 3-channel color in the working colorspace.
///
/// Every channel is normalized to `[0, 1]`, whatever the colorspace.
/// Channel meaning (R,G,B or L,a,b, ...) is defined by [`crate::Colorspace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub channels: [f32; 3],
}

impl Color {
    pub const fn new(c1: f32, c2: f32, c3: f32) -> Self {
        Self {
            channels: [c1, c2, c3],
        }
    }

    /// Mean of the squared channel differences.
    ///
    /// This is `rmse(self, other)²`. Ordering by it is identical to ordering
    /// by [`Color::rmse`], so hot loops use this form and skip the sqrt.
    #[inline]
    pub fn mean_sq_diff(self, other: Self) -> f32 {
        let d0 = self.channels[0] - other.channels[0];
        let d1 = self.channels[1] - other.channels[1];
        let d2 = self.channels[2] - other.channels[2];
        (d0 * d0 + d1 * d1 + d2 * d2) / 3.0
    }

    /// Root-mean-square distance over the three channels.
    pub fn rmse(self, other: Self) -> f32 {
        self.mean_sq_diff(other).sqrt()
    }

    /// Clamp every channel into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            channels: self.channels.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// Whether every channel lies in `[0, 1]`.
    pub fn in_range(self) -> bool {
        self.channels.iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Channels scaled to 8 bits, rounded and clamped.
    pub fn to_u8(self) -> [u8; 3] {
        self.channels
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn from_u8(c: [u8; 3]) -> Self {
        Self {
            channels: c.map(|v| v as f32 / 255.0),
        }
    }

    /// `#RRGGBB` of the raw channels, without colorspace conversion.
    pub fn to_hex(self) -> String {
        let [a, b, c] = self.to_u8();
        format!("#{a:02X}{b:02X}{c:02X}")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse an opaque sRGB color specification.
///
/// Accepts `#rgb`, `#rrggbb`, `rgb(r,g,b)` with 0..255 or percentage
/// components, and the basic CSS color names. Returns sRGB channels in
/// `[0, 1]`; callers convert into the working colorspace.
pub fn parse_color_spec(spec: &str) -> Result<[f32; 3], KMeansError> {
    let invalid = || KMeansError::InvalidSeedColor(spec.to_string());
    let s = spec.trim();
    if s.is_empty() {
        return Err(invalid());
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(body) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(body).ok_or_else(invalid);
    }

    named_color(&lower)
        .map(|c| [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0])
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<[f32; 3]> {
    let bytes = hex.as_bytes();
    let rgb = match bytes.len() {
        3 => {
            let r = hex_digit(bytes[0])?;
            let g = hex_digit(bytes[1])?;
            let b = hex_digit(bytes[2])?;
            [r * 17, g * 17, b * 17]
        }
        6 => [
            hex_byte(&bytes[0..2])?,
            hex_byte(&bytes[2..4])?,
            hex_byte(&bytes[4..6])?,
        ],
        _ => return None,
    };
    Some(rgb.map(|v| v as f32 / 255.0))
}

const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = hex_digit(bytes[0])?;
    let lo = hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

fn parse_rgb_function(body: &str) -> Option<[f32; 3]> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut out = [0.0f32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = if let Some(pct) = part.strip_suffix('%') {
            let v: f32 = pct.trim().parse().ok()?;
            if !(0.0..=100.0).contains(&v) {
                return None;
            }
            v / 100.0
        } else {
            let v: f32 = part.parse().ok()?;
            if !(0.0..=255.0).contains(&v) {
                return None;
            }
            v / 255.0
        };
    }
    Some(out)
}

fn named_color(name: &str) -> Option<[u8; 3]> {
    let rgb = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "lime" => [0, 255, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        "brown" => [165, 42, 42],
        "pink" => [255, 192, 203],
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_is_symmetric_and_zero_on_identity() {
        let a = Color::new(0.1, 0.5, 0.9);
        let b = Color::new(0.4, 0.2, 0.0);
        assert_eq!(a.rmse(b), b.rmse(a));
        assert_eq!(a.rmse(a), 0.0);
        assert!(a.rmse(b) > 0.0);
    }

    #[test]
    fn rmse_averages_over_channels() {
        // One channel differs by 1.0: sqrt(1/3)
        let a = Color::new(0.0, 0.0, 0.0);
        let b = Color::new(1.0, 0.0, 0.0);
        assert!((a.rmse(b) - (1.0f32 / 3.0).sqrt()).abs() < 1e-6);
        // All channels differ by 1.0: 1.0
        let c = Color::new(1.0, 1.0, 1.0);
        assert!((a.rmse(c) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hex_output_is_uppercase() {
        assert_eq!(Color::new(1.0, 0.0, 0.5).to_hex(), "#FF0080");
        assert_eq!(Color::new(1.5, -0.2, 0.0).to_hex(), "#FF0000");
    }

    #[test]
    fn u8_roundtrip_is_exact() {
        for v in 0..=255u8 {
            let c = Color::from_u8([v, 255 - v, v / 2]);
            assert_eq!(c.to_u8(), [v, 255 - v, v / 2]);
        }
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color_spec("#f00").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_color_spec("#0000FF").unwrap(), [0.0, 0.0, 1.0]);
        assert!(parse_color_spec("#12345").is_err());
        assert!(parse_color_spec("#gg0000").is_err());
    }

    #[test]
    fn parses_rgb_function() {
        assert_eq!(parse_color_spec("rgb(255,0,0)").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(
            parse_color_spec("RGB(0%,100%,0%)").unwrap(),
            [0.0, 1.0, 0.0]
        );
        assert!(parse_color_spec("rgb(256,0,0)").is_err());
        assert!(parse_color_spec("rgb(1,2)").is_err());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(parse_color_spec("Red").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_color_spec("blue").unwrap(), [0.0, 0.0, 1.0]);
        assert!(matches!(
            parse_color_spec("reddish"),
            Err(KMeansError::InvalidSeedColor(s)) if s == "reddish"
        ));
        assert!(parse_color_spec("").is_err());
    }
}
