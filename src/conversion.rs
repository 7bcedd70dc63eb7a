use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::io::{create_dataset_yaml, list_xml_files, load_classes, setup_output_directories};
use crate::types::{ClassList, ConvertStats};
use crate::utils::create_progress_bar;
use crate::voc::VocAnnotation;

/// Derive the image file name an annotation refers to. PascalVOC tooling
/// pairs `name.xml` with `name.jpg`; other image extensions are not looked
/// for.
pub fn image_name_for(xml_file_name: &str) -> String {
    xml_file_name.replace(".xml", ".jpg")
}

/// Convert a parsed annotation to YOLO label lines. Objects whose name is not
/// in the class list are dropped; line order follows the annotation.
pub fn convert_annotation(annotation: &VocAnnotation, classes: &ClassList) -> Vec<String> {
    let image_width = annotation.size.width as f64;
    let image_height = annotation.size.height as f64;
    let mut lines = Vec::with_capacity(annotation.objects.len());

    for object in &annotation.objects {
        let class_id = match classes.id_of(&object.name) {
            Some(class_id) => class_id,
            None => continue,
        };

        let bndbox = &object.bndbox;
        let x_center = (bndbox.xmin + bndbox.xmax) as f64 / 2.0 / image_width;
        let y_center = (bndbox.ymin + bndbox.ymax) as f64 / 2.0 / image_height;
        let width = (bndbox.xmax - bndbox.xmin) as f64 / image_width;
        let height = (bndbox.ymax - bndbox.ymin) as f64 / image_height;
        lines.push(format!(
            "{} {} {} {} {}",
            class_id, x_center, y_center, width, height
        ));
    }

    lines
}

/// Process a single PascalVOC annotation file: copy its image and write the
/// YOLO label file. Annotations without a matching image are skipped.
pub fn process_annotation(
    xml_path: &Path,
    images_dir: &Path,
    output_images_dir: &Path,
    output_labels_dir: &Path,
    classes: &ClassList,
    stats: &mut ConvertStats,
) -> Result<(), Box<dyn std::error::Error>> {
    stats.increment_total();

    let xml_file_name = xml_path.file_name().unwrap().to_str().unwrap();
    let image_file_name = image_name_for(xml_file_name);
    let image_path = images_dir.join(&image_file_name);

    if !image_path.exists() {
        debug!(
            "Skipping {}: image file {} not found",
            xml_path.display(),
            image_path.display()
        );
        stats.increment_skipped_missing_image();
        return Ok(());
    }

    let xml_content = fs::read_to_string(xml_path)?;
    let annotation: VocAnnotation = serde_xml_rs::from_str(&xml_content)
        .map_err(|e| format!("Failed to parse {}: {}", xml_path.display(), e))?;
    if annotation.size.width == 0 || annotation.size.height == 0 {
        return Err(format!(
            "Invalid image size {}x{} in {}",
            annotation.size.width,
            annotation.size.height,
            xml_path.display()
        )
        .into());
    }

    let lines = convert_annotation(&annotation, classes);
    stats.add_objects_written(lines.len());
    stats.add_objects_dropped(annotation.objects.len() - lines.len());

    // Copy the image file
    let sanitized_name = sanitize_filename::sanitize(&image_file_name);
    let image_output_path = output_images_dir.join(&sanitized_name);
    fs::copy(&image_path, &image_output_path)?;

    // Write the label file, one line per retained object and no trailing
    // newline; an annotation without retained objects still gets its file
    let stem = sanitized_name
        .strip_suffix(".jpg")
        .unwrap_or(&sanitized_name);
    let label_output_path = output_labels_dir.join(format!("{}.txt", stem));
    let mut writer = BufWriter::new(File::create(&label_output_path)?);
    writer.write_all(lines.join("\n").as_bytes())?;

    stats.increment_successful();
    Ok(())
}

/// Convert a folder of PascalVOC annotations to a YOLO dataset
pub fn convert_directory(
    images_dir: &Path,
    labels_dir: &Path,
    output_dir: &Path,
    classes_file: &Path,
) -> Result<ConvertStats, Box<dyn std::error::Error>> {
    let classes = load_classes(classes_file)
        .map_err(|e| format!("Failed to read classes file {}: {}", classes_file.display(), e))?;
    if classes.is_empty() {
        warn!(
            "Classes file {} is empty; every object will be dropped",
            classes_file.display()
        );
    }

    let (output_images_dir, output_labels_dir) = setup_output_directories(output_dir)?;

    let xml_files = list_xml_files(labels_dir);
    info!(
        "Found {} annotation files in {}",
        xml_files.len(),
        labels_dir.display()
    );

    let pb = create_progress_bar(xml_files.len() as u64, "Converting");
    let mut stats = ConvertStats::new();
    for xml_path in &xml_files {
        process_annotation(
            xml_path,
            images_dir,
            &output_images_dir,
            &output_labels_dir,
            &classes,
            &mut stats,
        )?;
        pb.inc(1);
    }
    pb.finish();

    create_dataset_yaml(output_dir, &classes)?;
    stats.print_summary();
    Ok(stats)
}
