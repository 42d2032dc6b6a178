//! Diagnostic text output: seed/final colors, swatches, per-iteration progress.

use core::fmt;
use core::str::FromStr;
use std::io::{self, Write};

use crate::color::Color;
use crate::colorspace::Colorspace;
use crate::convergence::IterationState;
use crate::error::KMeansError;
use crate::kmeans::{Observer, Termination};

/// Which diagnostics to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Seed and final colors as `#RRGGBB` in the working colorspace.
    HexColors,
    /// A 24-bit ANSI color block per seed and final color.
    Swatches,
    /// One `iteration=<k> 100*rmse=<value>` line per iteration.
    Progress,
    All,
}

impl ViewMode {
    pub fn shows_hex(self) -> bool {
        matches!(self, Self::HexColors | Self::All)
    }

    pub fn shows_swatches(self) -> bool {
        matches!(self, Self::Swatches | Self::All)
    }

    pub fn shows_progress(self) -> bool {
        matches!(self, Self::Progress | Self::All)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HexColors => "hexcolors",
            Self::Swatches => "swatches",
            Self::Progress => "progress",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hexcolors" => Ok(Self::HexColors),
            "swatches" => Ok(Self::Swatches),
            "progress" => Ok(Self::Progress),
            "all" => Ok(Self::All),
            _ => Err(KMeansError::invalid_option(
                "view",
                format!("expected hexcolors, swatches, progress or all, got {s:?}"),
            )),
        }
    }
}

/// [`Observer`] that writes view-mode diagnostics to a text sink.
///
/// Observer callbacks cannot fail, so the first write error is held and
/// returned by [`ViewReporter::finish`]; later output is skipped.
pub struct ViewReporter<W: Write> {
    out: W,
    mode: ViewMode,
    colorspace: Colorspace,
    error: Option<io::Error>,
}

impl<W: Write> ViewReporter<W> {
    pub fn new(out: W, mode: ViewMode, colorspace: Colorspace) -> Self {
        Self {
            out,
            mode,
            colorspace,
            error: None,
        }
    }

    /// Flush and hand back the sink, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, f: impl FnOnce(&mut W, ViewMode, Colorspace) -> io::Result<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = f(&mut self.out, self.mode, self.colorspace) {
            self.error = Some(err);
        }
    }

    fn color_list(&mut self, title: &'static str, colors: &[Color]) {
        if !self.mode.shows_hex() && !self.mode.shows_swatches() {
            return;
        }
        self.emit(|out, mode, colorspace| {
            writeln!(out, "{title}:")?;
            for &c in colors {
                if mode.shows_swatches() {
                    write!(out, "{} ", swatch(colorspace, c))?;
                }
                writeln!(out, "{}", c.to_hex())?;
            }
            Ok(())
        });
    }
}

impl<W: Write> Observer for ViewReporter<W> {
    fn seeded(&mut self, seeds: &[Color]) {
        self.color_list("seed colors", seeds);
    }

    fn iteration(&mut self, state: &IterationState) {
        if !self.mode.shows_progress() {
            return;
        }
        self.emit(|out, _, _| progress_line(out, state));
    }

    fn finished(&mut self, clusters: &[Color], _termination: Termination) {
        self.color_list("final colors", clusters);
    }
}

/// `iteration=<k> 100*rmse=<value>`
pub fn progress_line(out: &mut impl Write, state: &IterationState) -> io::Result<()> {
    writeln!(out, "iteration={} 100*rmse={}", state.iteration, state.rmse)
}

/// Six-cell ANSI true-color block showing `c` converted to sRGB.
pub fn swatch(colorspace: Colorspace, c: Color) -> String {
    let p = colorspace.to_rgb8(c);
    format!("\x1b[48;2;{};{};{}m      \x1b[0m", p.r, p.g, p.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(iteration: u32, rmse: f64) -> IterationState {
        IterationState {
            iteration,
            previous: Vec::new(),
            updated: Vec::new(),
            rmse,
            counts: Vec::new(),
        }
    }

    fn output(reporter: ViewReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.finish().unwrap()).unwrap()
    }

    #[test]
    fn parses_modes() {
        assert_eq!("hexcolors".parse::<ViewMode>().unwrap(), ViewMode::HexColors);
        assert_eq!("ALL".parse::<ViewMode>().unwrap(), ViewMode::All);
        assert!(matches!(
            "verbose".parse::<ViewMode>(),
            Err(KMeansError::InvalidOption { option: "view", .. })
        ));
    }

    #[test]
    fn progress_lines() {
        let mut r = ViewReporter::new(Vec::new(), ViewMode::Progress, Colorspace::Srgb);
        r.seeded(&[Color::new(1.0, 0.0, 0.0)]);
        r.iteration(&state(1, 2.5));
        r.iteration(&state(2, 0.0));
        r.finished(&[], Termination::Converged);
        assert_eq!(output(r), "iteration=1 100*rmse=2.5\niteration=2 100*rmse=0\n");
    }

    #[test]
    fn hex_lists_use_working_colorspace_values() {
        let mut r = ViewReporter::new(Vec::new(), ViewMode::HexColors, Colorspace::YCbCr);
        r.seeded(&[Color::new(1.0, 0.5, 0.5), Color::new(0.0, 0.0, 1.0)]);
        r.iteration(&state(1, 1.0));
        r.finished(&[Color::new(0.2, 0.4, 0.6)], Termination::MaxItersReached);
        assert_eq!(
            output(r),
            "seed colors:\n#FF8080\n#0000FF\nfinal colors:\n#336699\n"
        );
    }

    #[test]
    fn swatches_are_srgb_blocks() {
        let mut r = ViewReporter::new(Vec::new(), ViewMode::Swatches, Colorspace::Srgb);
        r.seeded(&[Color::new(1.0, 0.0, 0.0)]);
        let text = output(r);
        assert!(text.contains("\x1b[48;2;255;0;0m"));
        assert!(text.contains("#FF0000"));
    }

    #[test]
    fn all_prints_everything() {
        let mut r = ViewReporter::new(Vec::new(), ViewMode::All, Colorspace::Srgb);
        r.seeded(&[Color::new(0.0, 0.0, 0.0)]);
        r.iteration(&state(1, 0.0));
        r.finished(&[Color::new(1.0, 1.0, 1.0)], Termination::Converged);
        let text = output(r);
        assert!(text.contains("seed colors:"));
        assert!(text.contains("iteration=1 100*rmse=0"));
        assert!(text.contains("final colors:"));
        assert!(text.contains("\x1b[48;2;255;255;255m"));
    }
}
