use std::cell::Cell;
use std::fs;

use image::{Rgb, RgbImage};

use ppe_tools::{annotate_directory, process_image, AnnotateStats, Detection, Detector};

/// Detector test double returning a fixed set of detections and counting how
/// often it was invoked.
struct StubDetector {
    detections: Vec<Detection>,
    names: Vec<String>,
    calls: Cell<usize>,
}

impl StubDetector {
    fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            names: Vec::new(),
            calls: Cell::new(0),
        }
    }

    fn with_names(detections: Vec<Detection>, names: &[&str]) -> Self {
        Self {
            detections,
            names: names.iter().map(|n| n.to_string()).collect(),
            calls: Cell::new(0),
        }
    }
}

impl Detector for StubDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.detections.clone())
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }
}

struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        Err("inference failed".into())
    }

    fn class_name(&self, _class_id: usize) -> Option<&str> {
        None
    }
}

fn detection(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Detection {
    Detection {
        x1,
        y1,
        x2,
        y2,
        score,
        class_id,
    }
}

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

#[test]
fn test_low_confidence_person_never_reaches_the_ppe_detector() {
    let mut image = RgbImage::new(64, 64);
    let original = image.clone();
    let person_detector = StubDetector::new(vec![detection(5.0, 5.0, 40.0, 40.0, 0.4, 0)]);
    let ppe_detector = StubDetector::new(vec![detection(1.0, 1.0, 10.0, 10.0, 0.9, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(ppe_detector.calls.get(), 0);
    assert_eq!(stats.persons_annotated, 0);
    assert_eq!(image, original);
}

#[test]
fn test_person_threshold_is_strict() {
    let mut image = RgbImage::new(64, 64);
    let person_detector = StubDetector::new(vec![detection(5.0, 5.0, 40.0, 40.0, 0.5, 0)]);
    let ppe_detector = StubDetector::new(vec![detection(1.0, 1.0, 10.0, 10.0, 0.9, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(ppe_detector.calls.get(), 0);
    assert_eq!(stats.persons_annotated, 0);
}

#[test]
fn test_image_without_persons_is_left_unmodified() {
    let mut image = RgbImage::from_pixel(32, 32, Rgb([40, 50, 60]));
    let original = image.clone();
    let person_detector = StubDetector::new(Vec::new());
    let ppe_detector = StubDetector::new(vec![detection(1.0, 1.0, 10.0, 10.0, 0.9, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(person_detector.calls.get(), 1);
    assert_eq!(ppe_detector.calls.get(), 0);
    assert_eq!(image, original);
}

#[test]
fn test_degenerate_person_boxes_are_skipped() {
    let mut image = RgbImage::new(64, 64);
    let original = image.clone();
    // One box entirely outside the image, one with zero width
    let person_detector = StubDetector::new(vec![
        detection(700.0, 10.0, 800.0, 20.0, 0.9, 0),
        detection(10.0, 10.0, 10.0, 50.0, 0.9, 0),
    ]);
    let ppe_detector = StubDetector::new(vec![detection(1.0, 1.0, 10.0, 10.0, 0.9, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(ppe_detector.calls.get(), 0);
    assert_eq!(stats.persons_annotated, 0);
    assert_eq!(image, original);
}

#[test]
fn test_ppe_boxes_land_at_the_crop_offset() {
    let mut image = RgbImage::new(100, 100);
    let person_detector = StubDetector::new(vec![detection(10.0, 10.0, 60.0, 60.0, 0.9, 0)]);
    let ppe_detector =
        StubDetector::with_names(vec![detection(5.0, 5.0, 20.0, 20.0, 0.9, 0)], &["helmet"]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    // Box corners drawn at crop coordinates land shifted by the crop origin
    assert_eq!(*image.get_pixel(15, 15), GREEN);
    assert_eq!(*image.get_pixel(30, 15), GREEN);
    assert_eq!(*image.get_pixel(30, 30), GREEN);
    // Interior and pixels outside the box stay untouched
    assert_eq!(*image.get_pixel(22, 22), BLACK);
    assert_eq!(*image.get_pixel(50, 50), BLACK);
    assert_eq!(*image.get_pixel(5, 5), BLACK);

    assert_eq!(stats.persons_annotated, 1);
    assert_eq!(stats.ppe_boxes_drawn, 1);
}

#[test]
fn test_hard_hat_boxes_are_blue() {
    let mut image = RgbImage::new(100, 100);
    let person_detector = StubDetector::new(vec![detection(10.0, 10.0, 60.0, 60.0, 0.9, 0)]);
    let ppe_detector =
        StubDetector::with_names(vec![detection(5.0, 5.0, 20.0, 20.0, 0.9, 0)], &["hard-hat"]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(*image.get_pixel(15, 15), BLUE);
}

#[test]
fn test_ppe_at_the_threshold_is_not_drawn() {
    let mut image = RgbImage::new(100, 100);
    let original = image.clone();
    let person_detector = StubDetector::new(vec![detection(10.0, 10.0, 60.0, 60.0, 0.9, 0)]);
    let ppe_detector = StubDetector::new(vec![detection(5.0, 5.0, 20.0, 20.0, 0.5, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    assert_eq!(ppe_detector.calls.get(), 1);
    assert_eq!(stats.persons_annotated, 1);
    assert_eq!(stats.ppe_boxes_drawn, 0);
    // The crop was blitted back unchanged
    assert_eq!(image, original);
}

#[test]
fn test_overlapping_persons_keep_earlier_annotations() {
    let mut image = RgbImage::new(64, 64);
    let person_detector = StubDetector::new(vec![
        detection(0.0, 0.0, 30.0, 30.0, 0.9, 0),
        detection(10.0, 10.0, 40.0, 40.0, 0.9, 0),
    ]);
    // The same relative box on each crop
    let ppe_detector = StubDetector::new(vec![detection(12.0, 12.0, 20.0, 20.0, 0.9, 0)]);
    let mut stats = AnnotateStats::new();

    process_image(
        &mut image,
        &person_detector,
        &ppe_detector,
        None,
        &mut stats,
    )
    .unwrap();

    // First person's box survives the second person's blit because the second
    // crop is taken after the first one was written back
    assert_eq!(*image.get_pixel(12, 12), GREEN);
    assert_eq!(*image.get_pixel(22, 22), GREEN);
    assert_eq!(ppe_detector.calls.get(), 2);
    assert_eq!(stats.persons_annotated, 2);
    assert_eq!(stats.ppe_boxes_drawn, 2);
}

#[test]
fn test_annotate_directory_writes_every_image() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    let first = RgbImage::from_pixel(16, 16, Rgb([10, 20, 30]));
    let second = RgbImage::from_pixel(16, 16, Rgb([200, 100, 50]));
    first.save(input_dir.join("first.png")).unwrap();
    second.save(input_dir.join("second.png")).unwrap();

    let person_detector = StubDetector::new(Vec::new());
    let ppe_detector = StubDetector::new(Vec::new());

    let stats = annotate_directory(
        &input_dir,
        &output_dir,
        &person_detector,
        &ppe_detector,
        None,
    )
    .unwrap();

    assert_eq!(stats.images_processed, 2);
    assert_eq!(person_detector.calls.get(), 2);

    // Images without confident persons pass through unmodified
    let first_out = image::open(output_dir.join("first.png")).unwrap().to_rgb8();
    let second_out = image::open(output_dir.join("second.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(first_out, first);
    assert_eq!(second_out, second);
}

#[test]
fn test_detector_failure_aborts_the_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();
    RgbImage::new(16, 16).save(input_dir.join("a.png")).unwrap();

    let ppe_detector = StubDetector::new(Vec::new());
    let result = annotate_directory(
        &input_dir,
        &output_dir,
        &FailingDetector,
        &ppe_detector,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_unreadable_entry_aborts_the_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();
    fs::write(input_dir.join("notes.txt"), "not an image").unwrap();

    let person_detector = StubDetector::new(Vec::new());
    let ppe_detector = StubDetector::new(Vec::new());
    let result = annotate_directory(
        &input_dir,
        &output_dir,
        &person_detector,
        &ppe_detector,
        None,
    );
    assert!(result.is_err());
}
