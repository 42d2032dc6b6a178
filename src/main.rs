// CLI entry for zenkmeans
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use zenkmeans::codec::segment_file;
use zenkmeans::{Colorspace, KMeansConfig, Observer, ViewMode, ViewReporter};

#[derive(Parser, Debug)]
#[command(
    name = "zenkmeans",
    version,
    about = "K-means color segmentation of an opaque image"
)]
struct Cli {
    /// Number of clusters (> 1); ignored when --seedcolors is given
    #[arg(short = 'n', long = "numcolors", default_value_t = 5)]
    numcolors: usize,

    /// Space-separated seed colors, e.g. "red #00ff00 rgb(0,0,255)"
    #[arg(short = 's', long = "seedcolors")]
    seedcolors: Option<String>,

    /// Iteration cap (> 0)
    #[arg(short = 'm', long = "maxiters", default_value_t = 40)]
    maxiters: u32,

    /// Stop threshold on 100*rmse of cluster drift (>= 0)
    #[arg(short = 'c', long = "convergence", default_value_t = 0.05)]
    convergence: f64,

    /// Working colorspace: sRGB, RGB, Lab, OKLab, YCbCr
    #[arg(short = 'C', long = "colorspace", default_value = "sRGB")]
    colorspace: String,

    /// Diagnostics: hexcolors, swatches, progress, all
    #[arg(short = 'v', long = "view")]
    view: Option<String>,

    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output image path; format follows the extension
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> Result<KMeansConfig> {
    let colorspace: Colorspace = cli.colorspace.parse()?;
    let mut cfg = KMeansConfig::new()
        .numcolors(cli.numcolors)
        .max_iters(cli.maxiters)
        .convergence(cli.convergence)
        .colorspace(colorspace);
    if let Some(list) = &cli.seedcolors {
        cfg = cfg.seed_colors(list);
    }
    if let Some(view) = &cli.view {
        cfg = cfg.view(view.parse::<ViewMode>()?);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = build_config(cli)?;
    let input = cli.input.as_deref();
    let output = cli.output.as_deref();

    let result = match cfg.view {
        Some(mode) => {
            let mut reporter = ViewReporter::new(io::stdout().lock(), mode, cfg.colorspace);
            let result = segment_file(input, output, &cfg, &mut reporter as &mut dyn Observer);
            reporter.finish().context("writing view output")?;
            result?
        }
        None => segment_file(input, output, &cfg, &mut ())?,
    };

    log::info!(
        "{:?} after {} iterations (k={}, 100*rmse={})",
        result.termination(),
        result.iterations(),
        result.k(),
        result.rmse()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}
