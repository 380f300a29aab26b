// End-to-end properties of the normalize-and-score pipeline
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use proptest::prelude::*;
use std::io::Cursor;
use visham_detector::analyzer::{
    ANALYSIS_SIZE, AnalysisSurface, CoverTransform, ImageHandler, ImageSource, ThresholdTable,
    compute_score, normalize_and_score, score_pixels,
};
use visham_detector::{AnalysisResult, ImageError};

fn uniform_expected(c: u8) -> u8 {
    ((1.0 - c as f64 / 255.0) * 50.0 + 0.5).floor() as u8
}

fn tiled_surface(palette: &[[u8; 4]]) -> AnalysisSurface {
    let img = RgbaImage::from_fn(ANALYSIS_SIZE, ANALYSIS_SIZE, |x, y| {
        Rgba(palette[((x * 31 + y * 17) as usize) % palette.len()])
    });
    AnalysisSurface::from_rgba(img).expect("256x256 surface")
}

#[test]
fn black_and_white_frames_hit_documented_scores() {
    let black = RgbaImage::from_pixel(1280, 720, Rgba([0, 0, 0, 255]));
    let white = RgbaImage::from_pixel(720, 1280, Rgba([255, 255, 255, 255]));

    let black = normalize_and_score(ImageSource::Frame(black)).expect("black");
    let white = normalize_and_score(ImageSource::Frame(white)).expect("white");

    assert_eq!(black.score.value(), 50);
    assert_eq!(white.score.value(), 0);
}

#[test]
fn half_black_half_white_surface_scores_ninety_five() {
    let img = RgbaImage::from_fn(256, 256, |_, y| {
        if y < 128 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let surface = AnalysisSurface::from_rgba(img).expect("surface");

    let result = AnalysisResult::from_surface(&surface, ThresholdTable::default_table());

    assert_eq!(result.score.value(), 95);
    assert_eq!(result.label, "🔥 Visham Detected — Ningal Allandakum!");
}

#[test]
fn wide_frame_transform_matches_cover_rule() {
    let t = CoverTransform::compute(512, 256).expect("transform");

    assert_eq!((t.scale, t.dw, t.dh, t.dx, t.dy), (1.0, 512.0, 256.0, -128.0, 0.0));
}

#[test]
fn zero_dimension_source_never_produces_a_score() {
    let result = normalize_and_score(ImageSource::Frame(RgbaImage::new(320, 0)));

    assert!(matches!(result, Err(ImageError::InvalidInput(_))));
}

#[test]
fn uploaded_file_is_scored_like_the_frame() {
    let frame = RgbaImage::from_fn(400, 300, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]));
    let path = std::env::temp_dir().join(format!("visham-upload-{}.png", std::process::id()));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(frame.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    std::fs::write(&path, cursor.into_inner()).expect("write upload");

    let handler = ImageHandler::default();
    let from_file = handler.analyze(ImageSource::FilePath(path.to_string_lossy().into_owned()));
    let _ = std::fs::remove_file(&path);
    let from_frame = handler.analyze(ImageSource::Frame(frame)).expect("frame");

    assert_eq!(from_file.expect("file"), from_frame);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn score_is_always_within_bounds(palette in prop::collection::vec(any::<[u8; 4]>(), 1..16)) {
        let surface = tiled_surface(&palette);
        let score = compute_score(&surface).value();

        prop_assert!(score <= 100);
    }

    #[test]
    fn scoring_is_deterministic(palette in prop::collection::vec(any::<[u8; 4]>(), 1..16)) {
        let surface = tiled_surface(&palette);

        prop_assert_eq!(compute_score(&surface), compute_score(&surface.clone()));
    }

    #[test]
    fn uniform_surface_follows_closed_form(c in any::<u8>()) {
        let pixels = [c, c, c, 255].repeat((ANALYSIS_SIZE * ANALYSIS_SIZE) as usize);

        prop_assert_eq!(score_pixels(&pixels).value(), uniform_expected(c));
    }

    #[test]
    fn uniform_frame_of_any_size_scores_like_its_color(
        width in 1u32..400,
        height in 1u32..400,
        c in any::<u8>(),
    ) {
        let frame = RgbaImage::from_pixel(width, height, Rgba([c, c, c, 255]));
        let result = normalize_and_score(ImageSource::Frame(frame)).expect("valid frame");

        prop_assert_eq!(result.score.value(), uniform_expected(c));
    }

    #[test]
    fn every_score_resolves_to_a_table_label(value in 0u8..=100) {
        let table = ThresholdTable::default_table();
        let label = table.resolve(visham_detector::analyzer::Score::new(value));

        prop_assert!(table.entries().iter().any(|t| t.label == label));
    }
}
