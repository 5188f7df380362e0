use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use super::{grid_shape, suptitle, DEEP_PALETTE, TITLE_HEIGHT};
use crate::config::ensure_parent;
use crate::error::{Result, TopicsError};
use crate::table::TopicTable;

pub const CLOUD_SIZE: u32 = 500;
const CAPTION_HEIGHT: u32 = 28;
const MAX_FONT: u32 = 96;
const MIN_FONT: u32 = 10;
const FONT_STEP: u32 = 2;
const CHAR_WIDTH: f64 = 0.6;   // Glyph width as a fraction of font size
const SPIRAL_STEP: f64 = 0.1;

/// A word positioned inside a cloud, in pixels from the panel's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub font_size: u32,
    pub rank: usize,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        x < self.x + self.width && self.x < x + w && y < self.y + self.height && self.y < y + h
    }
}

fn text_box(text: &str, font_size: u32) -> (i32, i32) {
    let w = (text.chars().count() as f64 * font_size as f64 * CHAR_WIDTH).ceil() as i32;
    (w.max(1), font_size as i32)
}

/// Lay out weighted words on a `width` x `height` canvas. Heavier words get
/// larger fonts and are placed first, spiralling out from the centre; a word
/// that cannot fit is shrunk until it does or dropped at the minimum size.
pub fn layout(words: &[(String, f64)], width: u32, height: u32) -> Vec<PlacedWord> {
    let mut ranked: Vec<&(String, f64)> = words.iter().filter(|(t, _)| !t.is_empty()).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max_weight = ranked.first().map(|(_, w)| *w).unwrap_or(0.0);
    let max_font = MAX_FONT.min(height / 4).max(MIN_FONT);

    let (cw, ch) = (width as i32, height as i32);
    let max_radius = ((cw * cw + ch * ch) as f64).sqrt() / 2.0;
    let mut placed: Vec<PlacedWord> = Vec::new();

    for (rank, (text, weight)) in ranked.into_iter().enumerate() {
        // All-zero topics still get a readable cloud with equal sizes.
        let relative = if max_weight > 0.0 { (weight / max_weight).clamp(0.0, 1.0) } else { 1.0 };
        let mut font_size = MIN_FONT + ((max_font - MIN_FONT) as f64 * relative).round() as u32;

        loop {
            let (w, h) = text_box(text, font_size);
            if let Some((x, y)) = find_spot(&placed, w, h, cw, ch, max_radius) {
                placed.push(PlacedWord {
                    text: text.clone(),
                    x,
                    y,
                    width: w,
                    height: h,
                    font_size,
                    rank,
                });
                break;
            }
            if font_size <= MIN_FONT {
                break;
            }
            font_size = font_size.saturating_sub(FONT_STEP).max(MIN_FONT);
        }
    }

    placed
}

fn find_spot(placed: &[PlacedWord], w: i32, h: i32, cw: i32, ch: i32, max_radius: f64) -> Option<(i32, i32)> {
    if w > cw || h > ch {
        return None;
    }
    let (cx, cy) = (cw as f64 / 2.0, ch as f64 / 2.0);
    let mut theta: f64 = 0.0;

    loop {
        let r = 2.0 * theta;
        if r > max_radius {
            return None;
        }
        let x = (cx + r * theta.cos() - w as f64 / 2.0).round() as i32;
        let y = (cy + r * theta.sin() - h as f64 / 2.0).round() as i32;

        let inside = x >= 0 && y >= 0 && x + w <= cw && y + h <= ch;
        if inside && !placed.iter().any(|p| p.overlaps(x, y, w, h)) {
            return Some((x, y));
        }
        theta += SPIRAL_STEP;
    }
}

/// Faceted word clouds: one 500x500 panel per topic, term size following its
/// contribution to the topic.
pub fn save(table: &TopicTable, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    draw(table, path).map_err(|e| TopicsError::render(path, e))?;
    debug!(path = %path.display(), "Wrote topic word clouds");
    Ok(())
}

fn draw(table: &TopicTable, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let topics = table.topic_count();
    let (rows, cols) = grid_shape(topics);
    let size = (
        cols as u32 * CLOUD_SIZE,
        rows as u32 * (CLOUD_SIZE + CAPTION_HEIGHT) + TITLE_HEIGHT,
    );

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(
        &suptitle(&table.corpus_name),
        ("sans-serif", 28).into_font().style(FontStyle::Bold),
    )?;

    for (panel, topic_index) in body.split_evenly((rows, cols)).iter().zip(1..=topics) {
        let words: Vec<(String, f64)> = table
            .terms_for(topic_index)
            .into_iter()
            .map(|t| (t.term.clone(), t.term_coef))
            .collect();
        draw_panel(panel, topic_index, &words)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    topic_index: usize,
    words: &[(String, f64)],
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let cloud = panel.titled(&format!("topic_index = {topic_index}"), ("sans-serif", 16))?;
    let (width, height) = cloud.dim_in_pixel();

    for word in layout(words, width, height) {
        let color = DEEP_PALETTE[word.rank % DEEP_PALETTE.len()];
        cloud.draw(&Text::new(
            word.text.clone(),
            (word.x, word.y),
            ("sans-serif", word.font_size as f64).into_font().color(&color),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<(String, f64)> {
        [
            ("inhibition", 0.12),
            ("stroop", 0.09),
            ("interference", 0.05),
            ("conflict", 0.04),
            ("color", 0.03),
            ("naming", 0.02),
            ("reaction_time", 0.02),
            ("congruent", 0.01),
        ]
        .iter()
        .map(|(t, w)| (t.to_string(), *w))
        .collect()
    }

    #[test]
    fn places_every_word_inside_canvas() {
        let placed = layout(&words(), CLOUD_SIZE, CLOUD_SIZE);
        assert_eq!(placed.len(), 8);
        for p in &placed {
            assert!(p.x >= 0 && p.y >= 0);
            assert!(p.x + p.width <= CLOUD_SIZE as i32);
            assert!(p.y + p.height <= CLOUD_SIZE as i32);
        }
    }

    #[test]
    fn words_do_not_overlap() {
        let placed = layout(&words(), CLOUD_SIZE, CLOUD_SIZE);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height), "{} overlaps {}", a.text, b.text);
            }
        }
    }

    #[test]
    fn heavier_words_are_larger() {
        let placed = layout(&words(), CLOUD_SIZE, CLOUD_SIZE);
        let size = |t: &str| placed.iter().find(|p| p.text == t).unwrap().font_size;
        assert!(size("inhibition") > size("congruent"));
        assert_eq!(placed[0].text, "inhibition");
    }

    #[test]
    fn zero_weights_still_render() {
        let zeros: Vec<(String, f64)> = vec![("a_term".into(), 0.0), ("b_term".into(), 0.0)];
        let placed = layout(&zeros, CLOUD_SIZE, CLOUD_SIZE);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].font_size, placed[1].font_size);
    }

    #[test]
    fn tiny_canvas_drops_words_that_cannot_fit() {
        let placed = layout(&words(), 20, 12);
        assert!(placed.len() < words().len());
    }
}
