// Faceted PNG renderings of a topic table, one panel per topic.

pub mod barplot;
pub mod trace;
pub mod wordcloud;

use plotters::style::RGBColor;

/// Panels per row of a faceted figure.
pub const COL_WRAP: usize = 4;

/// Seaborn's "deep" qualitative palette, cycled per topic.
pub const DEEP_PALETTE: [RGBColor; 10] = [
    RGBColor(0x4C, 0x72, 0xB0),
    RGBColor(0xDD, 0x84, 0x52),
    RGBColor(0x55, 0xA8, 0x68),
    RGBColor(0xC4, 0x4E, 0x52),
    RGBColor(0x81, 0x72, 0xB3),
    RGBColor(0x93, 0x78, 0x60),
    RGBColor(0xDA, 0x8B, 0xC3),
    RGBColor(0x8C, 0x8C, 0x8C),
    RGBColor(0xCC, 0xB9, 0x74),
    RGBColor(0x64, 0xB5, 0xCD),
];

pub const TITLE_HEIGHT: u32 = 60;

pub fn topic_color(topic_index: usize) -> RGBColor {
    DEEP_PALETTE[topic_index.saturating_sub(1) % DEEP_PALETTE.len()]
}

/// `(rows, cols)` of a wrapped facet grid holding `panels` panels.
pub fn grid_shape(panels: usize) -> (usize, usize) {
    let panels = panels.max(1);
    let cols = panels.min(COL_WRAP);
    let rows = (panels + cols - 1) / cols;
    (rows, cols)
}

pub fn suptitle(corpus_name: &str) -> String {
    format!("{corpus_name} topics")
}
