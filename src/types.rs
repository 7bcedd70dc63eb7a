/// A single detection in pixel coordinates of the image it was produced from.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the bottom-right corner and
/// `score` the detector confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another detection.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

// Integer sub-rectangle of an image, used to crop person regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Derive the crop rectangle for a detection on an image of the given
    /// size. Coordinates are truncated to whole pixels and clamped to the
    /// image bounds; returns None when nothing of the box remains.
    pub fn from_detection(
        detection: &Detection,
        image_width: u32,
        image_height: u32,
    ) -> Option<CropRect> {
        let x1 = (detection.x1 as i64).clamp(0, image_width as i64);
        let y1 = (detection.y1 as i64).clamp(0, image_height as i64);
        let x2 = (detection.x2 as i64).clamp(0, image_width as i64);
        let y2 = (detection.y2 as i64).clamp(0, image_height as i64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(CropRect {
            x: x1 as u32,
            y: y1 as u32,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        })
    }
}

/// Ordered class names; the position of a name is its class id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn from_names(names: Vec<String>) -> Self {
        Self(names)
    }

    /// The id of a class name: the first position it appears at.
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Struct to hold converter run statistics
#[derive(Debug, Default, Clone)]
pub struct ConvertStats {
    pub total_files_processed: usize,
    pub successful_conversions: usize,
    pub skipped_missing_image: usize,
    pub objects_written: usize,
    pub objects_dropped: usize,
}

impl ConvertStats {
    pub fn new() -> Self {
        Self {
            total_files_processed: 0,
            successful_conversions: 0,
            skipped_missing_image: 0,
            objects_written: 0,
            objects_dropped: 0,
        }
    }

    pub fn increment_total(&mut self) {
        self.total_files_processed += 1;
    }

    pub fn increment_successful(&mut self) {
        self.successful_conversions += 1;
    }

    pub fn increment_skipped_missing_image(&mut self) {
        self.skipped_missing_image += 1;
    }

    pub fn add_objects_written(&mut self, count: usize) {
        self.objects_written += count;
    }

    pub fn add_objects_dropped(&mut self, count: usize) {
        self.objects_dropped += count;
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Total annotation files processed: {}", self.total_files_processed);
        log::info!("Successful conversions: {}", self.successful_conversions);
        log::info!("Skipped (missing image file): {}", self.skipped_missing_image);
        log::info!("Objects written: {}", self.objects_written);

        if self.objects_dropped > 0 {
            log::warn!(
                "Objects dropped (label not in the class list): {}",
                self.objects_dropped
            );
        }
        if self.skipped_missing_image > 0 {
            log::warn!(
                "Skipped annotations without a matching image: {}",
                self.skipped_missing_image
            );
        }
    }
}

// Struct to hold annotation pipeline run statistics
#[derive(Debug, Default, Clone)]
pub struct AnnotateStats {
    pub images_processed: usize,
    pub persons_annotated: usize,
    pub ppe_boxes_drawn: usize,
}

impl AnnotateStats {
    pub fn new() -> Self {
        Self {
            images_processed: 0,
            persons_annotated: 0,
            ppe_boxes_drawn: 0,
        }
    }

    pub fn increment_images(&mut self) {
        self.images_processed += 1;
    }

    pub fn increment_persons(&mut self) {
        self.persons_annotated += 1;
    }

    pub fn increment_boxes(&mut self) {
        self.ppe_boxes_drawn += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Annotation Summary ===");
        log::info!("Images processed: {}", self.images_processed);
        log::info!("Person regions annotated: {}", self.persons_annotated);
        log::info!("PPE boxes drawn: {}", self.ppe_boxes_drawn);
    }
}
