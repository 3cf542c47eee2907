use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use marker_overlay_rs::image_pipeline::{
    CameraIntrinsics, ContourMarkerDetector, DetectorConfig, FrameWriter, MarkerOverlayPipeline,
    OutputConfig, OutputFormat, PipelineConfig, PipelineError, PngFrameWriter, RawFrame,
    Rotation, TiffCompression, TiffFrameWriter, Yuv420Converter, frame::types::frame_len,
};
use marker_overlay_rs::logger;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// Y plane, then U plane, then V plane
    I420,
    /// Y plane, then interleaved V/U
    Nv21,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Tiff,
    Png,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compression {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

#[derive(Parser)]
#[command(name = "marker_overlay")]
#[command(about = "Detect square markers in raw YUV 4:2:0 frames and draw a cube on each")]
#[command(version)]
struct Cli {
    /// File holding one or more back-to-back raw frames.
    #[arg(long)]
    input: PathBuf,

    /// Frame width in pixels (even).
    #[arg(long)]
    width: usize,

    /// Frame height in pixels (even).
    #[arg(long)]
    height: usize,

    /// Byte layout of each frame.
    #[arg(long, value_enum, default_value = "i420")]
    layout: Layout,

    /// Clockwise rotation to apply: 0, 90, 180 or 270.
    #[arg(long, default_value = "0")]
    rotation: u32,

    /// Directory for annotated frames.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value = "tiff")]
    format: Format,

    /// TIFF compression.
    #[arg(long, value_enum, default_value = "none")]
    compression: Compression,

    /// JSON file with {"fx", "fy", "cx", "cy"}; defaults to the 800/800/640/360 placeholder.
    #[arg(long)]
    intrinsics: Option<PathBuf>,

    #[arg(long, default_value = "50.0")]
    canny_low: f32,

    #[arg(long, default_value = "150.0")]
    canny_high: f32,

    /// Report a nested outline once instead of once per traced border.
    #[arg(long)]
    dedup_nested: bool,

    /// Print a per-stage timing table for every frame.
    #[arg(long)]
    timings: bool,
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    info!("Starting marker_overlay...");

    let config = build_config(&cli)?;
    info!(
        "Camera intrinsics: fx={} fy={} cx={} cy={}",
        config.intrinsics.fx, config.intrinsics.fy, config.intrinsics.cx, config.intrinsics.cy
    );

    let detector = ContourMarkerDetector::new(config.detector.clone());
    match cli.format {
        Format::Tiff => run(
            &cli,
            MarkerOverlayPipeline::with_custom(Yuv420Converter, detector, TiffFrameWriter, config),
            OutputFormat::Tiff,
        ),
        Format::Png => run(
            &cli,
            MarkerOverlayPipeline::with_custom(Yuv420Converter, detector, PngFrameWriter, config),
            OutputFormat::Png,
        ),
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let intrinsics = match &cli.intrinsics {
        Some(path) => load_intrinsics(path)?,
        None => CameraIntrinsics::default(),
    };

    let compression = match cli.compression {
        Compression::None => TiffCompression::None,
        Compression::Lzw => TiffCompression::Lzw,
        Compression::DeflateFast => TiffCompression::DeflateFast,
        Compression::DeflateBalanced => TiffCompression::DeflateBalanced,
        Compression::DeflateBest => TiffCompression::DeflateBest,
    };

    let config = PipelineConfig::builder()
        .intrinsics(intrinsics)
        .detector(DetectorConfig {
            canny_low: cli.canny_low,
            canny_high: cli.canny_high,
            dedup_nested: cli.dedup_nested,
            ..DetectorConfig::default()
        })
        .output(OutputConfig {
            compression,
            predictor: None,
        })
        .build()?;
    Ok(config)
}

fn load_intrinsics(path: &Path) -> anyhow::Result<CameraIntrinsics> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))?;
    let intrinsics: CameraIntrinsics = serde_json::from_str(&text)
        .with_context(|| format!("parsing intrinsics from {}", path.display()))?;
    Ok(intrinsics)
}

fn run<W: FrameWriter>(
    cli: &Cli,
    pipeline: MarkerOverlayPipeline<Yuv420Converter, ContourMarkerDetector, W>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rotation = Rotation::try_from(cli.rotation)?;
    let frame_size = frame_len(cli.width, cli.height)?;

    let data = std::fs::read(&cli.input)
        .map_err(|e| PipelineError::InputReadError(format!("{}: {}", cli.input.display(), e)))?;
    if data.len() < frame_size {
        bail!(
            "{} holds {} bytes, less than one {}x{} frame ({} bytes)",
            cli.input.display(),
            data.len(),
            cli.width,
            cli.height,
            frame_size
        );
    }
    let trailing = data.len() % frame_size;
    if trailing != 0 {
        warn!("Ignoring {} trailing bytes (partial frame)", trailing);
    }

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let mut processed = 0usize;
    for (index, chunk) in data.chunks_exact(frame_size).enumerate() {
        let frame = match cli.layout {
            Layout::I420 => RawFrame::from_i420(chunk, cli.width, cli.height),
            Layout::Nv21 => RawFrame::from_nv21(chunk, cli.width, cli.height),
        }
        .map(|frame| frame.with_rotation(rotation));

        let output_path = cli
            .output_dir
            .join(format!("frame_{:05}.{}", index, format.extension()));

        match frame.and_then(|frame| pipeline.process_frame_to_file(&frame, &output_path)) {
            Ok(output) => {
                processed += 1;
                if let Some(message) = output.notification() {
                    info!(frame = index, "{}", message);
                }
                if cli.timings {
                    output.print_summary(index);
                }
            }
            Err(e) => error!(frame = index, "Frame failed: {}", e),
        }
    }

    info!("Processed {} of {} frames", processed, data.len() / frame_size);
    Ok(())
}
