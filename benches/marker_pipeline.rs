use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use marker_overlay_rs::image_pipeline::{
    MarkerOverlayPipeline, OutputConfig, PipelineConfig, RawFrame, TiffCompression,
    convert_frame, detect_markers,
};
use std::io::Cursor;

/// Gray I420 frame with a dark square outline centred in the image.
fn generate_marker_frame(width: usize, height: usize) -> RawFrame {
    let mut data = vec![128u8; width * height * 3 / 2];
    let side = width.min(height) / 4;
    let (x0, y0) = ((width - side) / 2, (height - side) / 2);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            let border = x < x0 + 4 || x >= x0 + side - 4 || y < y0 + 4 || y >= y0 + side - 4;
            if border {
                data[y * width + x] = 16;
            }
        }
    }
    RawFrame::from_i420(&data, width, height).expect("valid frame")
}

fn benchmark_frame_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_frame_by_size");

    let sizes = vec![
        (320, 240, "320x240"),
        (640, 360, "640x360"),
        (1280, 720, "1280x720"),
    ];

    for (width, height, label) in sizes {
        let frame = generate_marker_frame(width, height);

        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            let pipeline = MarkerOverlayPipeline::new(PipelineConfig::default());

            b.iter(|| {
                let _ = pipeline.process_frame(black_box(frame));
            });
        });
    }

    group.finish();
}

fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let frame = generate_marker_frame(640, 360);
    let image = convert_frame(&frame).expect("convertible frame");

    group.bench_function("convert_frame", |b| {
        b.iter(|| {
            let _ = convert_frame(black_box(&frame));
        });
    });

    group.bench_function("detect_markers", |b| {
        b.iter(|| {
            let _ = detect_markers(black_box(&image));
        });
    });

    group.finish();
}

fn benchmark_output_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_compression");
    let frame = generate_marker_frame(640, 360);

    let compressions = vec![
        (TiffCompression::None, "none"),
        (TiffCompression::Lzw, "lzw"),
        (TiffCompression::DeflateFast, "deflate_fast"),
    ];

    for (compression, label) in compressions {
        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            let config = PipelineConfig::builder()
                .output(OutputConfig {
                    compression,
                    predictor: None,
                })
                .build()
                .expect("valid config");
            let pipeline = MarkerOverlayPipeline::new(config);

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.process_frame_into(black_box(frame), &mut output);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_frame_sizes,
    benchmark_stages,
    benchmark_output_compression
);
criterion_main!(benches);
