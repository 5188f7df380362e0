use std::path::Path;

use serde::Serialize;

use crate::coherence::ScoredTopic;
use crate::config::ensure_parent;
use crate::error::{Result, TopicsError};

/// One term of one topic, in long form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTerm {
    pub topic_index: usize,  // 1-based, in coherence order
    pub topic_score: f64,
    pub term: String,
    pub term_coef: f64,
}

/// Long-form table of every topic's top terms for one corpus.
#[derive(Debug, Clone)]
pub struct TopicTable {
    pub corpus_name: String,
    pub rows: Vec<TopicTerm>,
}

impl TopicTable {
    /// Explode ranked topics into rows. Topics keep their coherence order,
    /// terms keep their probability order.
    pub fn from_topics(corpus_name: &str, topics: &[ScoredTopic]) -> Self {
        let rows = topics
            .iter()
            .enumerate()
            .flat_map(|(i, topic)| {
                topic.terms.iter().map(move |(coef, term)| TopicTerm {
                    topic_index: i + 1,
                    topic_score: topic.coherence,
                    term: term.clone(),
                    term_coef: *coef,
                })
            })
            .collect();

        TopicTable {
            corpus_name: corpus_name.to_string(),
            rows,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.rows.iter().map(|r| r.topic_index).max().unwrap_or(0)
    }

    pub fn terms_for(&self, topic_index: usize) -> Vec<&TopicTerm> {
        self.rows.iter().filter(|r| r.topic_index == topic_index).collect()
    }

    pub fn max_coef(&self) -> f64 {
        self.rows.iter().map(|r| r.term_coef).fold(0.0, f64::max)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let csv_err = |source| TopicsError::Csv { path: path.to_path_buf(), source };

        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        for row in &self.rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| TopicsError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> Vec<ScoredTopic> {
        vec![
            ScoredTopic {
                terms: vec![(0.4, "stroop".to_string()), (0.2, "conflict".to_string())],
                coherence: -0.5,
            },
            ScoredTopic {
                terms: vec![(0.3, "memory".to_string())],
                coherence: -2.0,
            },
        ]
    }

    #[test]
    fn explodes_topics_into_rows() {
        let table = TopicTable::from_topics("tests/Stroop", &topics());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.topic_count(), 2);
        assert_eq!(
            table.rows[0],
            TopicTerm {
                topic_index: 1,
                topic_score: -0.5,
                term: "stroop".to_string(),
                term_coef: 0.4,
            }
        );
        assert_eq!(table.terms_for(2)[0].term, "memory");
        assert!((table.max_coef() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn writes_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tests_Stroop.csv");
        TopicTable::from_topics("tests/Stroop", &topics()).write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("topic_index,topic_score,term,term_coef"));
        assert_eq!(lines.count(), 3);
    }
}
