use image::{imageops, RgbImage};
use log::info;
use std::path::Path;

use crate::detector::Detector;
use crate::draw::{color_for_label, draw_box_outline, label_anchor, LabelFont};
use crate::io::list_images;
use crate::types::{AnnotateStats, CropRect};
use crate::utils::{create_output_directory, create_progress_bar};

/// Minimum score for a detection to be acted on, at both stages. The
/// comparison is strict, so a detection at exactly this score is ignored.
pub const SCORE_THRESHOLD: f32 = 0.5;

/// Annotate one image in place: crop each confidently detected person, run
/// the PPE detector on the crop, draw the PPE boxes and labels onto the crop
/// and blit it back. Crops are taken one person at a time, so overlapping
/// person regions see the annotations drawn before them.
pub fn process_image(
    image: &mut RgbImage,
    person_detector: &dyn Detector,
    ppe_detector: &dyn Detector,
    font: Option<&LabelFont>,
    stats: &mut AnnotateStats,
) -> Result<(), Box<dyn std::error::Error>> {
    let persons = person_detector.detect(image)?;

    for person in persons.iter().filter(|d| d.score > SCORE_THRESHOLD) {
        let rect = match CropRect::from_detection(person, image.width(), image.height()) {
            Some(rect) => rect,
            None => continue,
        };
        let mut crop =
            imageops::crop_imm(&*image, rect.x, rect.y, rect.width, rect.height).to_image();
        stats.increment_persons();

        let ppe_detections = ppe_detector.detect(&crop)?;
        for detection in ppe_detections.iter().filter(|d| d.score > SCORE_THRESHOLD) {
            let label = match ppe_detector.class_name(detection.class_id) {
                Some(name) => name.to_string(),
                None => format!("class_{}", detection.class_id),
            };
            let color = color_for_label(&label);
            draw_box_outline(
                &mut crop,
                detection.x1 as i32,
                detection.y1 as i32,
                detection.x2 as i32,
                detection.y2 as i32,
                color,
            );
            if let Some(font) = font {
                let (text_width, text_height) = font.text_size(&label);
                let (anchor_x, anchor_y) =
                    label_anchor(detection.x1 as i32, detection.y1 as i32, text_width, text_height);
                font.draw(&mut crop, &label, anchor_x, anchor_y, color);
            }
            stats.increment_boxes();
        }

        imageops::replace(image, &crop, rect.x as i64, rect.y as i64);
    }

    Ok(())
}

/// Annotate every image of a directory. Each entry is decoded, processed and
/// written to the output directory under its own name; images without
/// confident person detections pass through unmodified.
pub fn annotate_directory(
    input_dir: &Path,
    output_dir: &Path,
    person_detector: &dyn Detector,
    ppe_detector: &dyn Detector,
    font: Option<&LabelFont>,
) -> Result<AnnotateStats, Box<dyn std::error::Error>> {
    create_output_directory(output_dir)?;

    let entries = list_images(input_dir);
    info!("Found {} entries in {}", entries.len(), input_dir.display());

    let pb = create_progress_bar(entries.len() as u64, "Annotating");
    let mut stats = AnnotateStats::new();
    for path in &entries {
        let mut image = image::open(path)
            .map_err(|e| format!("Failed to read image {}: {}", path.display(), e))?
            .to_rgb8();
        process_image(&mut image, person_detector, ppe_detector, font, &mut stats)?;

        let output_path = output_dir.join(path.file_name().unwrap());
        image
            .save(&output_path)
            .map_err(|e| format!("Failed to save {}: {}", output_path.display(), e))?;
        stats.increment_images();
        pb.inc(1);
    }
    pb.finish();

    stats.print_summary();
    Ok(stats)
}
