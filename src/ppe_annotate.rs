use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::exit;

use ppe_tools::{annotate_directory, AnnotateArgs, LabelFont, YoloModel};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = AnnotateArgs::parse();

    let input_dir = PathBuf::from(&args.input_dir);
    if !input_dir.exists() {
        error!("The specified input_dir does not exist: {}", args.input_dir);
        exit(1);
    }

    let person_detector = match YoloModel::load(Path::new(&args.person_det_model)) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to load person detection model: {}", e);
            exit(1);
        }
    };
    let ppe_detector = match YoloModel::load(Path::new(&args.ppe_detection_model)) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to load PPE detection model: {}", e);
            exit(1);
        }
    };

    let font = match &args.font {
        Some(path) => match LabelFont::load(Path::new(path)) {
            Ok(font) => Some(font),
            Err(e) => {
                error!("{}", e);
                exit(1);
            }
        },
        None => LabelFont::discover(),
    };

    info!("Starting the annotation pipeline...");

    if let Err(e) = annotate_directory(
        &input_dir,
        Path::new(&args.output_dir),
        &person_detector,
        &ppe_detector,
        font.as_ref(),
    ) {
        error!("Failed to annotate images: {}", e);
        exit(1);
    }
}
