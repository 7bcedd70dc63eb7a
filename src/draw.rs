use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::warn;
use std::path::Path;

// Label text scale relative to a 30 px base em
const FONT_SCALE: f32 = 0.45;
const FONT_BASE_PX: f32 = 30.0;
const BOX_THICKNESS: i32 = 2;
const LABEL_MARGIN: i32 = 10;

// System fonts tried when no font is given on the command line
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
];

/// Annotation color for a PPE class label: blue for hard hats, green for
/// everything else.
pub fn color_for_label(label: &str) -> Rgb<u8> {
    if label == "hard-hat" {
        Rgb([0, 0, 255])
    } else {
        Rgb([0, 255, 0])
    }
}

/// Where a box label goes: left of the box with a margin, clamped to the
/// image edge, sitting on the box's top edge. The returned point is the
/// bottom-left corner of the text.
pub fn label_anchor(box_left: i32, box_top: i32, text_width: i32, text_height: i32) -> (i32, i32) {
    let x = (box_left - text_width - LABEL_MARGIN).max(0);
    let y = box_top + text_height / 2;
    (x, y)
}

/// Draw a rectangle outline two pixels thick. The corner points are
/// inclusive; the outline grows inward and parts outside the canvas are
/// clipped.
pub fn draw_box_outline(canvas: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb<u8>) {
    for inset in 0..BOX_THICKNESS {
        let width = x2 - x1 + 1 - 2 * inset;
        let height = y2 - y1 + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x1 + inset, y1 + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// TrueType font used for box labels.
pub struct LabelFont {
    font: FontVec,
    scale: PxScale,
}

impl LabelFont {
    /// Load a font from a TrueType file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read font {}: {}", path.display(), e))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| format!("Failed to load font {}: {}", path.display(), e))?;
        Ok(Self {
            font,
            scale: PxScale::from(FONT_SCALE * FONT_BASE_PX),
        })
    }

    /// Find a usable system font. Returns None when none of the candidates
    /// loads, in which case boxes are drawn without label text.
    pub fn discover() -> Option<Self> {
        for candidate in FONT_CANDIDATES {
            if let Ok(font) = Self::load(Path::new(candidate)) {
                return Some(font);
            }
        }
        warn!("No usable label font found; boxes will be drawn without text");
        None
    }

    /// Pixel size of the rendered text.
    pub fn text_size(&self, text: &str) -> (i32, i32) {
        let (width, height) = text_size(self.scale, &self.font, text);
        (width as i32, height as i32)
    }

    /// Draw text whose bottom-left corner sits at the anchor point.
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        anchor_x: i32,
        anchor_y: i32,
        color: Rgb<u8>,
    ) {
        let (_, text_height) = self.text_size(text);
        draw_text_mut(
            canvas,
            color,
            anchor_x,
            anchor_y - text_height,
            self.scale,
            &self.font,
            text,
        );
    }
}
