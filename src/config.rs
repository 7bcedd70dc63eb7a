use clap::Parser;

/// Command-line arguments for the two-stage person/PPE annotation pipeline.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct AnnotateArgs {
    /// Directory containing the images to annotate
    pub input_dir: String,

    /// Directory the annotated images are written to
    pub output_dir: String,

    /// Path to the person detection ONNX model
    pub person_det_model: String,

    /// Path to the PPE detection ONNX model
    pub ppe_detection_model: String,

    /// TrueType font used for box labels; common system fonts are tried when
    /// this is not given
    #[arg(long = "font")]
    pub font: Option<String>,
}

/// Command-line arguments for the PascalVOC to YOLO converter.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ConvertArgs {
    /// Folder containing the source images
    #[arg(long = "images_folder")]
    pub images_folder: String,

    /// Folder containing the PascalVOC XML annotation files
    #[arg(long = "labels_folder")]
    pub labels_folder: String,

    /// Folder the YOLO dataset is written to
    #[arg(long = "output_folder")]
    pub output_folder: String,

    /// Text file listing class names; a name's position defines its class id
    #[arg(long = "classes_file")]
    pub classes_file: String,
}
