use image::imageops::{self, FilterType};
use image::RgbImage;
use log::debug;
use std::path::Path;
use tract_onnx::prelude::*;

use crate::types::Detection;

/// Side length of the square model input
pub const INPUT_SIZE: u32 = 640;

// Candidates below this score are discarded before non-maximum suppression
const CONFIDENCE_FLOOR: f32 = 0.25;
const NMS_IOU_THRESHOLD: f32 = 0.45;

/// Object detection capability. Implementations run a model over a whole
/// image and return detections in that image's pixel coordinates.
pub trait Detector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;

    /// Human-readable name for a class id, if the detector knows one.
    fn class_name(&self, class_id: usize) -> Option<&str>;
}

/// A YOLO-family ONNX model executed with tract.
pub struct YoloModel {
    plan: TypedSimplePlan<TypedModel>,
    class_names: Vec<String>,
}

impl YoloModel {
    /// Load an ONNX model and pin its input to `1x3x640x640`. Class names are
    /// read from the model's `names` metadata when present, else from a
    /// `<model>.classes.txt` sidecar file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let proto = tract_onnx::onnx().proto_model_for_path(path)?;
        let class_names = class_names_from_proto(&proto)
            .or_else(|| class_names_from_sidecar(path))
            .unwrap_or_default();
        if class_names.is_empty() {
            debug!(
                "No class names found for {}; labels fall back to class ids",
                path.display()
            );
        }

        let plan = tract_onnx::onnx()
            .model_for_proto_model(&proto)?
            .with_input_fact(
                0,
                f32::fact([1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize]).into(),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { plan, class_names })
    }
}

impl Detector for YoloModel {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let (image_width, image_height) = image.dimensions();
        let resized = imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let input: Tensor = tract_ndarray::Array4::from_shape_fn(
            (1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize),
            |(_, channel, y, x)| resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        )
        .into();

        let outputs = self.plan.run(tvec!(input.into()))?;
        let output = outputs[0].to_array_view::<f32>()?;
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
            return Err(format!("Unexpected model output shape {:?}", shape).into());
        }
        let num_classes = shape[1] - 4;
        let num_anchors = shape[2];
        let scale_x = image_width as f32 / INPUT_SIZE as f32;
        let scale_y = image_height as f32 / INPUT_SIZE as f32;

        // Rows are cx, cy, w, h followed by one score row per class
        let mut candidates = Vec::new();
        for anchor in 0..num_anchors {
            let mut best_class = 0;
            let mut best_score = 0.0f32;
            for class_id in 0..num_classes {
                let score = output[[0, 4 + class_id, anchor]];
                if score > best_score {
                    best_score = score;
                    best_class = class_id;
                }
            }
            if best_score < CONFIDENCE_FLOOR {
                continue;
            }

            let cx = output[[0, 0, anchor]];
            let cy = output[[0, 1, anchor]];
            let width = output[[0, 2, anchor]];
            let height = output[[0, 3, anchor]];
            candidates.push(Detection {
                x1: (cx - width / 2.0) * scale_x,
                y1: (cy - height / 2.0) * scale_y,
                x2: (cx + width / 2.0) * scale_x,
                y2: (cy + height / 2.0) * scale_y,
                score: best_score,
                class_id: best_class,
            });
        }

        Ok(non_max_suppression(candidates, NMS_IOU_THRESHOLD))
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        self.class_names.get(class_id).map(String::as_str)
    }
}

/// Greedy class-aware non-maximum suppression. Detections are kept in
/// descending score order; a detection is dropped when it overlaps an
/// already-kept detection of the same class beyond the IoU threshold.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == detection.class_id && k.iou(&detection) > iou_threshold);
        if !suppressed {
            kept.push(detection);
        }
    }
    kept
}

/// Parse the ultralytics `names` metadata entry, e.g.
/// `{0: 'person', 1: 'hard-hat'}`. Ids missing from the map get a
/// `class_<id>` placeholder so positions stay aligned.
pub fn parse_names_metadata(value: &str) -> Option<Vec<String>> {
    let inner = value.trim().strip_prefix('{')?.strip_suffix('}')?;

    let mut entries = Vec::new();
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (id, name) = part.split_once(':')?;
        let id: usize = id.trim().parse().ok()?;
        let name = name
            .trim()
            .trim_matches(|ch| ch == '\'' || ch == '"')
            .to_string();
        entries.push((id, name));
    }
    if entries.is_empty() {
        return None;
    }

    let len = entries.iter().map(|(id, _)| id + 1).max().unwrap_or(0);
    let mut names = vec![String::new(); len];
    for (id, name) in entries {
        names[id] = name;
    }
    for (id, name) in names.iter_mut().enumerate() {
        if name.is_empty() {
            *name = format!("class_{}", id);
        }
    }
    Some(names)
}

fn class_names_from_proto(proto: &tract_onnx::pb::ModelProto) -> Option<Vec<String>> {
    proto
        .metadata_props
        .iter()
        .find(|prop| prop.key == "names")
        .and_then(|prop| parse_names_metadata(&prop.value))
}

fn class_names_from_sidecar(model_path: &Path) -> Option<Vec<String>> {
    let sidecar = model_path.with_extension("classes.txt");
    let content = std::fs::read_to_string(&sidecar).ok()?;
    let names: Vec<String> = content.split_whitespace().map(str::to_owned).collect();
    if names.is_empty() {
        None
    } else {
        debug!("Loaded {} class names from {}", names.len(), sidecar.display());
        Some(names)
    }
}
