use glob::glob;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::ClassList;
use crate::utils::create_output_directory;

/// Set up the directory structure for the converter output
pub fn setup_output_directories(output_dir: &Path) -> std::io::Result<(PathBuf, PathBuf)> {
    let images_dir = create_output_directory(&output_dir.join("images"))?;
    let labels_dir = create_output_directory(&output_dir.join("labels"))?;
    Ok((images_dir, labels_dir))
}

/// Read the class list from a whitespace-separated text file. The position of
/// a name in the file is its class id.
pub fn load_classes(path: &Path) -> std::io::Result<ClassList> {
    let content = fs::read_to_string(path)?;
    let names = content.split_whitespace().map(str::to_owned).collect();
    Ok(ClassList::from_names(names))
}

/// List the PascalVOC annotation files in a directory, in alphabetical order
pub fn list_xml_files(dir: &Path) -> Vec<PathBuf> {
    let xml_pattern = format!("{}/*.xml", dir.display());
    glob(&xml_pattern)
        .expect("Failed to read XML glob pattern")
        .filter_map(|entry| entry.ok())
        .collect()
}

/// List every entry of an image directory, in alphabetical order. No
/// extension filter is applied; entries that are not readable images fail at
/// decode time.
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let image_pattern = format!("{}/*", dir.display());
    glob(&image_pattern)
        .expect("Failed to read image glob pattern")
        .filter_map(|entry| entry.ok())
        .collect()
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(output_dir: &Path, classes: &ClassList) -> std::io::Result<()> {
    let dataset_yaml_path = output_dir.join("dataset.yaml");
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let absolute_path = fs::canonicalize(output_dir)?;
    let mut yaml_content = format!(
        "path: {}\ntrain: images\nval: images\ntest:\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");

    for (id, label) in classes.names().iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, label));
    }
    dataset_yaml.write_all(yaml_content.as_bytes())
}
