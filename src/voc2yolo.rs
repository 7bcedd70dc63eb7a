use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::exit;

use ppe_tools::{convert_directory, ConvertArgs};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ConvertArgs::parse();

    let labels_dir = PathBuf::from(&args.labels_folder);
    if !labels_dir.exists() {
        error!(
            "The specified labels_folder does not exist: {}",
            args.labels_folder
        );
        exit(1);
    }

    info!("Starting the conversion process...");

    if let Err(e) = convert_directory(
        Path::new(&args.images_folder),
        &labels_dir,
        Path::new(&args.output_folder),
        Path::new(&args.classes_file),
    ) {
        error!("Failed to convert dataset: {}", e);
        exit(1);
    }
}
