use clap::Parser;
use deepmatch::io::{load_rgb_image, save_rgb_image, save_rgba_image};
use deepmatch::{MatchSource, Model, ModelConfig, RansacParams};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Match two images with pretrained ONNX keypoint and matcher networks"
)]
struct Cli {
    /// Path to the keypoint/descriptor ONNX graph.
    #[arg(long, value_name = "FILE")]
    extractor: PathBuf,
    /// Path to the matcher ONNX graph.
    #[arg(long, value_name = "FILE")]
    matcher: PathBuf,
    /// Reference image.
    reference: PathBuf,
    /// Target image.
    target: PathBuf,
    /// Write the side-by-side match visualization here.
    #[arg(long, value_name = "FILE")]
    matches_out: Option<PathBuf>,
    /// Write the target warped into the reference frame here.
    #[arg(long, value_name = "FILE")]
    warped_out: Option<PathBuf>,
    /// Write the combined matches + warped report here.
    #[arg(long, value_name = "FILE")]
    report_out: Option<PathBuf>,
    /// Drop matches whose confidence is not strictly above this value.
    #[arg(long)]
    min_score: Option<f32>,
    /// Network input resolution (square), fixed at model export time.
    #[arg(long, default_value_t = 640)]
    input_size: u32,
    /// RANSAC reprojection threshold in pixels.
    #[arg(long, default_value_t = 5.0)]
    ransac_threshold: f64,
    /// Register the reference under this key and match through the cache.
    #[arg(long, value_name = "KEY")]
    template_key: Option<String>,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    matches: usize,
    mean_score: f32,
    homography_found: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("deepmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    let config = ModelConfig {
        input_width: cli.input_size,
        input_height: cli.input_size,
        min_score: cli.min_score,
        ransac: RansacParams {
            inlier_threshold: cli.ransac_threshold,
            ..RansacParams::default()
        },
        ..ModelConfig::default()
    };
    let model = Model::with_config(&cli.extractor, &cli.matcher, config)?;

    let reference = load_rgb_image(&cli.reference)?;
    let target = load_rgb_image(&cli.target)?;

    let result = match &cli.template_key {
        Some(key) => {
            model.register_template(key, &reference)?;
            model.infer(MatchSource::Template(key), &target)?
        }
        None => model.infer(MatchSource::Image(&reference), &target)?,
    };

    let warped = model.estimate_and_warp(&reference, &target, &result)?;

    if let Some(path) = &cli.matches_out {
        let panel = model.draw_matches(&reference, &target, &result)?;
        save_rgb_image(path, &panel)?;
    }
    if let (Some(path), Some(warped)) = (&cli.warped_out, warped.as_ref()) {
        save_rgba_image(path, warped)?;
    }
    if let Some(path) = &cli.report_out {
        let report = model.render_result(&reference, &target, &result)?;
        save_rgb_image(path, &report)?;
    }

    let mean_score = if result.is_empty() {
        0.0
    } else {
        result.scores.iter().sum::<f32>() / result.scores.len() as f32
    };
    let summary = Summary {
        matches: result.len(),
        mean_score,
        homography_found: warped.is_some(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
