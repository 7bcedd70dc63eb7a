use serde::Deserialize;

/// Root `<annotation>` element of a PascalVOC file.
///
/// Only the elements the converter needs are modeled; everything else in the
/// file (`folder`, `filename`, `segmented`, ...) is ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct VocAnnotation {
    pub size: VocSize,
    #[serde(rename = "object", default)]
    pub objects: Vec<VocObject>,
}

// The <size> element carrying the image dimensions
#[derive(Debug, Deserialize, Clone)]
pub struct VocSize {
    pub width: u32,
    pub height: u32,
}

// One annotated <object> element
#[derive(Debug, Deserialize, Clone)]
pub struct VocObject {
    pub name: String,
    pub bndbox: VocBndBox,
}

// Corner coordinates of an object's bounding box, in pixels
#[derive(Debug, Deserialize, Clone)]
pub struct VocBndBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}
