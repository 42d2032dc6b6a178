//! Working colorspaces and sRGB conversion.
//!
//! Every colorspace maps into channels normalized to `[0, 1]` so that the
//! distance metric and the convergence threshold mean the same thing in all of
//! them. Signed opponent channels (a/b, Cb/Cr) are offset by 0.5.

use core::fmt;
use core::str::FromStr;

use palette::{FromColor, Lab, LinSrgb, Oklab, Srgb};

use crate::color::Color;
use crate::error::KMeansError;

/// Colorspace in which clustering distances are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colorspace {
    /// Gamma-encoded sRGB, the input's native encoding.
    #[default]
    Srgb,
    /// Linear-light RGB with sRGB primaries.
    LinearRgb,
    /// CIE L*a*b* (D65). L/100, a/255 + 0.5, b/255 + 0.5.
    Lab,
    /// OKLab. L, a + 0.5, b + 0.5.
    OkLab,
    /// Full-range BT.601 YCbCr.
    YCbCr,
}

impl Colorspace {
    pub const ALL: [Colorspace; 5] = [
        Colorspace::Srgb,
        Colorspace::LinearRgb,
        Colorspace::Lab,
        Colorspace::OkLab,
        Colorspace::YCbCr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::LinearRgb => "RGB",
            Self::Lab => "Lab",
            Self::OkLab => "OKLab",
            Self::YCbCr => "YCbCr",
        }
    }

    /// Convert normalized sRGB channels into this colorspace.
    pub fn from_srgb(self, rgb: [f32; 3]) -> Color {
        let [c1, c2, c3] = match self {
            Self::Srgb => rgb,
            Self::LinearRgb => {
                let lin = linear(rgb);
                [lin.red, lin.green, lin.blue]
            }
            Self::Lab => {
                let lab: Lab = Lab::from_color(linear(rgb));
                [lab.l / 100.0, lab.a / 255.0 + 0.5, lab.b / 255.0 + 0.5]
            }
            Self::OkLab => {
                let lab: Oklab = Oklab::from_color(linear(rgb));
                [lab.l, lab.a + 0.5, lab.b + 0.5]
            }
            Self::YCbCr => {
                let [r, g, b] = rgb;
                [
                    0.299 * r + 0.587 * g + 0.114 * b,
                    -0.168_736 * r - 0.331_264 * g + 0.5 * b + 0.5,
                    0.5 * r - 0.418_688 * g - 0.081_312 * b + 0.5,
                ]
            }
        };
        Color::new(c1, c2, c3).clamped()
    }

    /// Convert a color in this colorspace back to normalized sRGB, clamped.
    pub fn to_srgb(self, color: Color) -> [f32; 3] {
        let [c1, c2, c3] = color.channels;
        let rgb = match self {
            Self::Srgb => color.channels,
            Self::LinearRgb => decoded(LinSrgb::new(c1, c2, c3)),
            Self::Lab => {
                let lab: Lab = Lab::new(c1 * 100.0, (c2 - 0.5) * 255.0, (c3 - 0.5) * 255.0);
                decoded(LinSrgb::from_color(lab))
            }
            Self::OkLab => {
                let lab: Oklab = Oklab::new(c1, c2 - 0.5, c3 - 0.5);
                decoded(LinSrgb::from_color(lab))
            }
            Self::YCbCr => {
                let cb = c2 - 0.5;
                let cr = c3 - 0.5;
                [
                    c1 + 1.402 * cr,
                    c1 - 0.344_136 * cb - 0.714_136 * cr,
                    c1 + 1.772 * cb,
                ]
            }
        };
        rgb.map(|c| c.clamp(0.0, 1.0))
    }

    /// Convert an 8-bit sRGB pixel into this colorspace.
    pub fn from_rgb8(self, p: rgb::RGB<u8>) -> Color {
        let srgb = Color::from_u8([p.r, p.g, p.b]);
        self.from_srgb(srgb.channels)
    }

    /// Convert a color in this colorspace to an 8-bit sRGB pixel.
    pub fn to_rgb8(self, color: Color) -> rgb::RGB<u8> {
        let [r, g, b] = Color {
            channels: self.to_srgb(color),
        }
        .to_u8();
        rgb::RGB { r, g, b }
    }
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colorspace {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let cs = match lower.as_str() {
            "srgb" => Self::Srgb,
            "rgb" | "linear" | "linearrgb" => Self::LinearRgb,
            "lab" | "cielab" => Self::Lab,
            "oklab" => Self::OkLab,
            "ycbcr" => Self::YCbCr,
            _ => return Err(KMeansError::ColorspaceUnsupported(s.to_string())),
        };
        Ok(cs)
    }
}

/// Normalized sRGB channels as a `palette` color.
fn encoded([r, g, b]: [f32; 3]) -> Srgb {
    Srgb::new(r, g, b)
}

fn linear(rgb: [f32; 3]) -> LinSrgb {
    encoded(rgb).into_linear()
}

fn decoded(lin: LinSrgb) -> [f32; 3] {
    let srgb: Srgb = Srgb::from_linear(lin);
    [srgb.red, srgb.green, srgb.blue]
}
