use std::path::{Path, PathBuf};

use crate::corpus::file_stem_for;
use crate::error::{Result, TopicsError};

pub const BARPLOT_DIR: &str = "topic_barplots";
pub const WORDCLOUD_DIR: &str = "topic_wordclouds";
pub const TABLE_DIR: &str = "topic_terms";
pub const TRACE_DIR: &str = "coherence_traces";

/// Every knob of a run. Defaults reproduce the layout the corpora were
/// collected with (`data/pubmed/**.csv` in, `outputs/` out).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub corpus_prefixes: Vec<String>,
    pub extra_stop_words: Vec<String>,
    pub topics_min: usize,          // Inclusive
    pub topics_max: usize,          // Exclusive
    pub top_terms: usize,           // Terms per topic for scoring, tables and plots
    pub no_below: usize,            // Minimum document frequency
    pub no_above: f64,              // Maximum document frequency ratio
    pub keep_n: usize,
    pub phrase_min_count: usize,
    pub phrase_threshold: f64,
    pub iterations: usize,          // Gibbs sweeps per model
    pub seed: Option<u64>,
    pub write_tables: bool,
    pub plot_trace: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("data/pubmed"),
            output_dir: PathBuf::from("outputs"),
            corpus_prefixes: vec!["tests/".to_string(), "constructs".to_string()],
            extra_stop_words: vec!["study".to_string(), "task".to_string(), "test".to_string()],
            topics_min: 1,
            topics_max: 50,
            top_terms: 20,
            no_below: 2,
            no_above: 0.8,
            keep_n: 100_000,
            phrase_min_count: 5,
            phrase_threshold: 10.0,
            iterations: 200,
            seed: None,
            write_tables: true,
            plot_trace: false,
        }
    }
}

/// Where the artifacts of one corpus land.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub barplot: PathBuf,
    pub wordcloud: PathBuf,
    pub table: PathBuf,
    pub summary: PathBuf,
    pub trace: PathBuf,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topics_min == 0 {
            return Err(TopicsError::InvalidConfig("topics_min must be at least 1".into()));
        }
        if self.topics_min >= self.topics_max {
            return Err(TopicsError::InvalidConfig(format!(
                "empty topic range {}..{}",
                self.topics_min, self.topics_max
            )));
        }
        if !(self.no_above > 0.0 && self.no_above <= 1.0) {
            return Err(TopicsError::InvalidConfig(format!(
                "no_above must be in (0, 1], got {}",
                self.no_above
            )));
        }
        if self.top_terms == 0 {
            return Err(TopicsError::InvalidConfig("top_terms must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(TopicsError::InvalidConfig("iterations must be at least 1".into()));
        }
        Ok(())
    }

    pub fn output_paths(&self, corpus_name: &str) -> OutputPaths {
        let stem = file_stem_for(corpus_name);
        let under = |dir: &str, ext: &str| -> PathBuf {
            self.output_dir.join(dir).join(format!("{stem}.{ext}"))
        };
        OutputPaths {
            barplot: under(BARPLOT_DIR, "png"),
            wordcloud: under(WORDCLOUD_DIR, "png"),
            table: under(TABLE_DIR, "csv"),
            summary: under(TABLE_DIR, "json"),
            trace: under(TRACE_DIR, "png"),
        }
    }

    pub fn is_extra_stop_word(&self, word: &str) -> bool {
        self.extra_stop_words.iter().any(|w| w == word)
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TopicsError::io(parent, e))?;
    }
    Ok(())
}
