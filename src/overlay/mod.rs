pub mod bitmap_font;
pub mod renderer;
pub mod style;
