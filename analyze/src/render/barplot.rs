use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use tracing::debug;

use super::{grid_shape, suptitle, topic_color, TITLE_HEIGHT};
use crate::config::ensure_parent;
use crate::error::{Result, TopicsError};
use crate::table::{TopicTable, TopicTerm};

const PANEL_WIDTH: u32 = 420;
const PANEL_HEIGHT: u32 = 360;

/// Faceted horizontal bar charts: one panel per topic, terms on the y axis
/// ordered by contribution, coefficients on a shared x axis.
pub fn save(table: &TopicTable, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    draw(table, path).map_err(|e| TopicsError::render(path, e))?;
    debug!(path = %path.display(), "Wrote topic bar plots");
    Ok(())
}

fn draw(table: &TopicTable, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let topics = table.topic_count();
    let (rows, cols) = grid_shape(topics);
    let size = (
        cols as u32 * PANEL_WIDTH,
        rows as u32 * PANEL_HEIGHT + TITLE_HEIGHT,
    );

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(
        &suptitle(&table.corpus_name),
        ("sans-serif", 28).into_font().style(FontStyle::Bold),
    )?;

    // Shared x range across every facet.
    let x_max = shared_x_max(table);

    for (panel, topic_index) in body.split_evenly((rows, cols)).iter().zip(1..=topics) {
        let terms = table.terms_for(topic_index);
        draw_panel(panel, topic_index, &terms, x_max)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, plotters::coord::Shift>,
    topic_index: usize,
    terms: &[&TopicTerm],
    x_max: f64,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let n = terms.len().max(1);
    // Largest contribution at the top.
    let labels: Vec<String> = terms.iter().rev().map(|t| t.term.clone()).collect();
    let color = topic_color(topic_index);

    let mut chart = ChartBuilder::on(panel)
        .caption(format!("topic_index = {topic_index}"), ("sans-serif", 16))
        .margin(8)
        .x_label_area_size(28)
        .y_label_area_size(140)
        .build_cartesian_2d(0f64..x_max, (0usize..n).into_segmented())?;

    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels.get(*i).cloned().unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_for)
        .x_labels(4)
        .x_desc("term_coef")
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(terms.iter().rev().enumerate().map(|(i, term)| {
        Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (term.term_coef, SegmentValue::Exact(i + 1))],
            color.filled(),
        )
    }))?;

    Ok(())
}

/// Upper x bound shared by every panel, padded so the longest bar has room.
pub fn shared_x_max(table: &TopicTable) -> f64 {
    let max = table.max_coef();
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coherence::ScoredTopic;

    #[test]
    fn x_range_covers_largest_coefficient() {
        let table = TopicTable::from_topics(
            "tests/x",
            &[ScoredTopic {
                terms: vec![(0.2, "a".to_string()), (0.5, "b".to_string())],
                coherence: -1.0,
            }],
        );
        assert!(shared_x_max(&table) > 0.5);
    }

    #[test]
    fn x_range_of_all_zero_table_is_unit() {
        let table = TopicTable::from_topics(
            "tests/x",
            &[ScoredTopic {
                terms: vec![(0.0, "a".to_string())],
                coherence: 0.0,
            }],
        );
        assert_eq!(shared_x_max(&table), 1.0);
    }
}
