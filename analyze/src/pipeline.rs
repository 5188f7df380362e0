use std::fs;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::coherence::{top_topics, DocumentSets};
use crate::config::{ensure_parent, PipelineConfig};
use crate::corpus::{self, CorpusEntry};
use crate::dictionary::{BagOfWords, Dictionary};
use crate::error::{Result, TopicsError};
use crate::phrases;
use crate::preprocess::Preprocessor;
use crate::render;
use crate::selection::select_model;
use crate::table::TopicTable;

/// Documents turned into phrases, their dictionary and bag-of-words corpus.
pub struct PreparedCorpus {
    pub docs: Vec<Vec<String>>,
    pub dictionary: Dictionary,
    pub bows: Vec<BagOfWords>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TracePoint {
    pub num_topics: usize,
    pub coherence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusSummary {
    pub corpus_name: String,
    pub documents: usize,
    pub vocabulary: usize,
    pub num_topics: usize,
    pub coherence: f64,
    pub trace: Vec<TracePoint>,
    pub generated_at: DateTime<Utc>,
}

pub struct CorpusReport {
    pub summary: CorpusSummary,
    pub table: TopicTable,
    pub trace: Vec<(usize, f64)>,
}

/// Clean, phrase-merge and vectorize a corpus's texts.
pub fn prepare(
    texts: &[String],
    corpus_name: &str,
    config: &PipelineConfig,
    preprocessor: &Preprocessor,
) -> PreparedCorpus {
    let cleaned = preprocessor.clean_all(texts);
    let docs = phrases::detect(cleaned, corpus_name, config.phrase_min_count, config.phrase_threshold);

    let mut dictionary = Dictionary::from_documents(&docs);
    // Document-frequency bounds are meaningless for a single document. Rows
    // with neither abstract nor title never reach here, so a CSV with one
    // usable row and some blank ones still counts as a single document.
    if docs.len() > 1 {
        dictionary.filter_extremes(config.no_below, config.no_above, config.keep_n);
    }
    dictionary.retain(|_, token| !config.is_extra_stop_word(token) && token.chars().count() != 1);

    let bows = docs.iter().map(|doc| dictionary.doc2bow(doc)).collect();
    PreparedCorpus { docs, dictionary, bows }
}

/// Everything short of writing files: preprocessing, model selection and the
/// long-form topic table of the winner.
pub fn analyze(entry: &CorpusEntry, config: &PipelineConfig, preprocessor: &Preprocessor) -> Result<CorpusReport> {
    let texts = corpus::load(&entry.path)?;
    if texts.is_empty() {
        return Err(TopicsError::EmptyVocabulary(entry.name.clone()));
    }
    info!(corpus = %entry.name, documents = texts.len(), "Preprocessing");

    let prepared = prepare(&texts, &entry.name, config, preprocessor);
    info!(
        corpus = %entry.name,
        vocabulary = prepared.dictionary.len(),
        "Built dictionary"
    );

    let selection = select_model(&entry.name, &prepared.bows, &prepared.dictionary, config)?;

    let sets = DocumentSets::new(&prepared.bows);
    let topics = top_topics(&selection.model, &sets, &prepared.dictionary, config.top_terms);
    let table = TopicTable::from_topics(&entry.name, &topics);

    let summary = CorpusSummary {
        corpus_name: entry.name.clone(),
        documents: prepared.docs.len(),
        vocabulary: prepared.dictionary.len(),
        num_topics: selection.num_topics,
        coherence: selection.coherence,
        trace: selection
            .trace
            .iter()
            .map(|&(num_topics, coherence)| TracePoint { num_topics, coherence })
            .collect(),
        generated_at: Utc::now(),
    };

    Ok(CorpusReport {
        summary,
        table,
        trace: selection.trace,
    })
}

/// Analyze one corpus and write its figures (and tables, when enabled).
pub fn run_corpus(entry: &CorpusEntry, config: &PipelineConfig, preprocessor: &Preprocessor) -> Result<CorpusReport> {
    let report = analyze(entry, config, preprocessor)?;
    let paths = config.output_paths(&entry.name);

    if report.table.rows.is_empty() {
        warn!(corpus = %entry.name, "Winning model has no terms to plot");
    }

    render::barplot::save(&report.table, &paths.barplot)?;
    render::wordcloud::save(&report.table, &paths.wordcloud)?;

    if config.write_tables {
        report.table.write_csv(&paths.table)?;
        ensure_parent(&paths.summary)?;
        let json = serde_json::to_string_pretty(&report.summary)?;
        fs::write(&paths.summary, json).map_err(|e| TopicsError::io(&paths.summary, e))?;
    }

    if config.plot_trace {
        render::trace::save(&entry.name, &report.trace, &paths.trace)?;
    }

    info!(
        corpus = %entry.name,
        barplot = %paths.barplot.display(),
        wordcloud = %paths.wordcloud.display(),
        "Wrote topic figures"
    );

    Ok(report)
}

/// Run every corpus, logging failures instead of stopping. Returns how many
/// corpora failed.
pub fn process_corpora(entries: &[CorpusEntry], config: &PipelineConfig) -> usize {
    let preprocessor = Preprocessor::new(&config.extra_stop_words);
    let mut failed = 0;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Corpora [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for entry in entries {
        pb.set_message(entry.name.clone());
        match run_corpus(entry, config, &preprocessor) {
            Ok(report) => info!(
                corpus = %entry.name,
                num_topics = report.summary.num_topics,
                coherence = report.summary.coherence,
                "Corpus done"
            ),
            Err(e) => {
                error!(corpus = %entry.name, error = %e, "Corpus failed");
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    failed
}
