use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::coherence::{model_coherence, DocumentSets};
use crate::config::PipelineConfig;
use crate::dictionary::{BagOfWords, Dictionary};
use crate::error::{Result, TopicsError};
use crate::lda::{LDAConfig, LdaModel};

/// The winning model of a topic-count sweep.
pub struct Selection {
    pub model: LdaModel,
    pub num_topics: usize,
    pub coherence: f64,
    pub trace: Vec<(usize, f64)>,  // Coherence per tried topic count, ascending
}

/// Fit one model per topic count in `[topics_min, topics_max)` and keep the
/// most coherent. Ties go to the smaller topic count.
pub fn select_model(
    corpus_name: &str,
    corpus: &[BagOfWords],
    dictionary: &Dictionary,
    config: &PipelineConfig,
) -> Result<Selection> {
    let total_terms: usize = corpus.iter().flat_map(|bow| bow.iter().map(|(_, c)| *c)).sum();
    if dictionary.is_empty() || total_terms == 0 {
        return Err(TopicsError::EmptyVocabulary(corpus_name.to_string()));
    }

    let sets = DocumentSets::new(corpus);
    let counts = config.topics_min..config.topics_max;

    let pb = ProgressBar::new(counts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Fitting n_topics [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut best: Option<(usize, f64, LdaModel)> = None;
    let mut trace = Vec::with_capacity(counts.len());

    for num_topics in counts {
        let lda_config = LDAConfig {
            iterations: config.iterations,
            seed: config.seed,
            ..LDAConfig::with_topics(num_topics)
        };
        let model = LdaModel::fit(corpus, dictionary.len(), &lda_config);
        let score = model_coherence(&model, &sets, config.top_terms);
        debug!(corpus = corpus_name, num_topics, coherence = score, "Fitted model");
        trace.push((num_topics, score));

        // Only the running best survives; every other model is dropped here.
        let improves = match &best {
            Some((_, best_score, _)) => score > *best_score,
            None => true,
        };
        if improves {
            best = Some((num_topics, score, model));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let (num_topics, coherence, model) = best.ok_or_else(|| {
        TopicsError::InvalidConfig(format!("empty topic range {}..{}", config.topics_min, config.topics_max))
    })?;

    info!(corpus = corpus_name, num_topics, coherence, "Selected topic count");

    Ok(Selection {
        model,
        num_topics,
        coherence,
        trace,
    })
}
