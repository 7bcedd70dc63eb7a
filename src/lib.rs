//! PPE detection annotation tools
//!
//! This library backs two command-line utilities: a two-stage person and PPE
//! detection pipeline that draws annotated crops back into their source
//! images, and a PascalVOC XML to YOLO format converter.

pub mod config;
pub mod conversion;
pub mod detector;
pub mod draw;
pub mod io;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod voc;

// Re-export commonly used types and functions
pub use config::{AnnotateArgs, ConvertArgs};
pub use conversion::{convert_annotation, convert_directory, image_name_for};
pub use detector::{Detector, YoloModel};
pub use draw::{color_for_label, draw_box_outline, label_anchor, LabelFont};
pub use pipeline::{annotate_directory, process_image, SCORE_THRESHOLD};
pub use types::{AnnotateStats, ClassList, ConvertStats, CropRect, Detection};
pub use voc::{VocAnnotation, VocBndBox, VocObject, VocSize};
