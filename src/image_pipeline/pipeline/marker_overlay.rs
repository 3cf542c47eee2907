use tracing::{debug, info, instrument, warn};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    config::PipelineConfig,
    detect::{ContourMarkerDetector, MarkerDetector},
    frame::{FrameConverter, RawFrame, Yuv420Converter},
    pipeline::{FrameOutput, MarkerOutcome, PipelineTimings, Stage, StageTimer},
    pose::estimate_and_overlay,
    present::{FrameWriter, TiffFrameWriter},
};

pub struct MarkerOverlayPipeline<C: FrameConverter, D: MarkerDetector, W: FrameWriter> {
    converter: C,
    detector: D,
    writer: W,
    config: PipelineConfig,
}

impl MarkerOverlayPipeline<Yuv420Converter, ContourMarkerDetector, TiffFrameWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            converter: Yuv420Converter,
            detector: ContourMarkerDetector::new(config.detector.clone()),
            writer: TiffFrameWriter,
            config,
        }
    }
}

impl<C: FrameConverter, D: MarkerDetector, W: FrameWriter> MarkerOverlayPipeline<C, D, W> {
    pub fn with_custom(converter: C, detector: D, writer: W, config: PipelineConfig) -> Self {
        Self {
            converter,
            detector,
            writer,
            config,
        }
    }

    /// Converts, detects and overlays one frame.
    ///
    /// Only frame-level problems (bad plane sizes, unknown rotation) are
    /// returned as errors. A marker whose pose cannot be solved is recorded
    /// as [`MarkerOutcome::Skipped`] and the remaining markers still run.
    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn process_frame(&self, frame: &RawFrame) -> Result<FrameOutput> {
        let mut timings = PipelineTimings::new();

        let timer = StageTimer::start(Stage::Convert);
        let mut image = {
            let _span = tracing::info_span!("convert_frame").entered();
            self.converter.convert(frame)?
        };
        timings.record(timer);

        let timer = StageTimer::start(Stage::Detect);
        let regions = {
            let _span = tracing::info_span!("detect_markers").entered();
            self.detector.detect(&image)
        };
        timings.record(timer);

        if regions.is_empty() {
            debug!("No markers in frame");
        } else {
            info!("Detected {} markers!", regions.len());
        }

        let timer = StageTimer::start(Stage::Overlay);
        let outcomes: Vec<MarkerOutcome> = {
            let _span = tracing::info_span!("overlay_markers", markers = regions.len()).entered();
            regions
                .iter()
                .map(|region| {
                    match estimate_and_overlay(
                        &mut image,
                        region,
                        &self.config.intrinsics,
                        &self.config.overlay,
                    ) {
                        Ok(pose) => MarkerOutcome::Overlaid(pose),
                        Err(e) => {
                            warn!(?region, "Skipping marker: {}", e);
                            MarkerOutcome::Skipped(e.to_string())
                        }
                    }
                })
                .collect()
        };
        timings.record(timer);

        Ok(FrameOutput {
            image,
            regions,
            outcomes,
            timings,
        })
    }

    /// Processes one frame and encodes the annotated image into `output`.
    #[instrument(skip(self, frame, output))]
    pub fn process_frame_into(&self, frame: &RawFrame, output: &mut dyn Write) -> Result<FrameOutput> {
        let mut result = self.process_frame(frame)?;

        let timer = StageTimer::start(Stage::Present);
        {
            let _span = tracing::info_span!("present_frame").entered();
            self.writer.write_frame(&result.image, output, &self.config.output)?;
        }
        result.timings.record(timer);

        Ok(result)
    }

    #[instrument(skip(self, frame, output_path))]
    pub fn process_frame_to_file<P: AsRef<Path>>(
        &self,
        frame: &RawFrame,
        output_path: P,
    ) -> Result<FrameOutput> {
        let output_path = output_path.as_ref();

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        let result = self.process_frame_into(frame, &mut output_file)?;
        info!(
            output = %output_path.display(),
            markers = result.marker_count(),
            "Frame written"
        );
        Ok(result)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }
}
