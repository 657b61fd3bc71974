use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::overlay::bitmap_font;
use crate::overlay::style::OverlayStyle;
use ab_glyph::{FontArc, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use log::{info, warn};
use std::fmt;
use std::fs;
use std::path::Path;

const GLYPH_EXTENT_FLOOR: f32 = 8.0;

/// The font labels are written with.
#[derive(Clone)]
pub enum LabelFont {
    /// Built-in 3x5 glyphs, scaled up to roughly `label_scale` pixels high.
    Bitmap,
    TrueType(FontArc),
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFont::Bitmap => write!(f, "LabelFont::Bitmap"),
            LabelFont::TrueType(_) => write!(f, "LabelFont::TrueType"),
        }
    }
}

/// Draws detection boxes and their labels onto an RGB canvas.
#[derive(Clone, Debug)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    font: LabelFont,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        OverlayRenderer::new(OverlayStyle::default())
    }
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        OverlayRenderer {
            style,
            font: LabelFont::Bitmap,
        }
    }

    /// Uses the TrueType font at `font_path`, falling back to the bitmap font when the file
    /// cannot be read or parsed.
    pub fn with_font_file(style: OverlayStyle, font_path: &Path) -> Self {
        let font = match fs::read(font_path) {
            Ok(data) => match FontArc::try_from_vec(data) {
                Ok(font) => {
                    info!("Loaded label font from {}", font_path.display());
                    LabelFont::TrueType(font)
                }
                Err(e) => {
                    warn!(
                        "Could not parse font {}: {}. Falling back to bitmap.",
                        font_path.display(),
                        e
                    );
                    LabelFont::Bitmap
                }
            },
            Err(e) => {
                warn!(
                    "Could not read font {}: {}. Falling back to bitmap.",
                    font_path.display(),
                    e
                );
                LabelFont::Bitmap
            }
        };
        OverlayRenderer { style, font }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    /// Outlines the detection's box and writes its label just above the top-left corner.
    pub fn draw_detection(&self, image: &mut RgbImage, detection: &Detection) {
        self.draw_box(image, &detection.annotation);
        let x = detection.annotation.left().round() as i32;
        let y = (detection.annotation.top().round() as i32).saturating_sub(self.style.label_offset);
        self.draw_label(image, x, y, &detection.label());
    }

    /// Both corners are inclusive, so a box from 45 to 55 covers eleven pixels. Thickness grows
    /// inwards until the box is filled.
    pub fn draw_box(&self, image: &mut RgbImage, bbox: &BoundingBox) {
        let (canvas_width, canvas_height) = (image.width() as i64, image.height() as i64);
        let left = bbox.left().round() as i64;
        let top = bbox.top().round() as i64;
        let right = (bbox.right().round() as i64).max(left);
        let bottom = (bbox.bottom().round() as i64).max(top);
        for t in 0..self.style.line_width.max(1) as i64 {
            let (l, tp, r, b) = (
                left.saturating_add(t),
                top.saturating_add(t),
                right.saturating_sub(t),
                bottom.saturating_sub(t),
            );
            if l > r || tp > b {
                break;
            }
            if r < 0 || b < 0 || l >= canvas_width || tp >= canvas_height {
                continue;
            }
            // Edges beyond the canvas are pulled in to one pixel outside it, which leaves the
            // visible part of the outline unchanged.
            let l = l.max(-1);
            let tp = tp.max(-1);
            let r = r.min(canvas_width);
            let b = b.min(canvas_height);
            let rect = Rect::at(l as i32, tp as i32).of_size((r - l + 1) as u32, (b - tp + 1) as u32);
            draw_hollow_rect_mut(image, rect, self.style.color);
        }
    }

    /// Labels whose origin lies too far off the canvas to leave a visible pixel are skipped.
    pub fn draw_label(&self, image: &mut RgbImage, x: i32, y: i32, text: &str) {
        if !self.label_may_be_visible(image, x, y, text) {
            return;
        }
        match &self.font {
            LabelFont::TrueType(font) => {
                draw_text_mut(
                    image,
                    self.style.color,
                    x,
                    y,
                    PxScale::from(self.style.label_scale),
                    font,
                    text,
                );
            }
            LabelFont::Bitmap => {
                bitmap_font::draw_text_mut(image, self.style.color, x, y, self.bitmap_scale(), text);
            }
        }
    }

    fn label_may_be_visible(&self, image: &RgbImage, x: i32, y: i32, text: &str) -> bool {
        // Generous extent: one full em per character plus an em of margin on each side.
        let em = self.style.label_scale.max(GLYPH_EXTENT_FLOOR).ceil() as i64;
        let extent = (text.chars().count() as i64 + 1).saturating_mul(em);
        let (x, y) = (x as i64, y as i64);
        x + extent >= -em
            && y + em >= -em
            && x - em < image.width() as i64
            && y - em < image.height() as i64
    }

    fn bitmap_scale(&self) -> u32 {
        (self.style.label_scale / bitmap_font::GLYPH_HEIGHT as f32)
            .round()
            .max(1.0) as u32
    }
}
