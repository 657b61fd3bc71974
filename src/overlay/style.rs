use image::Rgb;

/// How boxes and labels are drawn onto an X-ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub color: Rgb<u8>,
    /// Outline thickness in pixels, grown towards the inside of the box.
    pub line_width: u32,
    /// How far above the box's top edge the label starts.
    pub label_offset: i32,
    /// Label height in pixels for TrueType fonts; the bitmap font rounds it to a whole glyph scale.
    pub label_scale: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            color: Rgb([255, 0, 0]),
            line_width: 3,
            label_offset: 10,
            label_scale: 12.0,
        }
    }
}
