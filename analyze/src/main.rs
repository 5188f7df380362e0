use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use corpus_topics::corpus;
use corpus_topics::pipeline::process_corpora;
use corpus_topics::PipelineConfig;

/// Extract topics from each cognitive test/construct corpus and plot them as
/// bar charts and word clouds.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(default_value = "data/pubmed", help = "Root directory of the corpus CSV files")]
    data_dir: PathBuf,
    #[clap(short, long, default_value = "outputs")]
    output_dir: PathBuf,
    #[clap(long, default_value_t = 1, help = "Smallest number of topics to try")]
    min_topics: usize,
    #[clap(long, default_value_t = 50, help = "Number of topics to stop before (exclusive)")]
    max_topics: usize,
    #[clap(long, default_value_t = 20, help = "Words per topic for scoring and plotting")]
    top_terms: usize,
    #[clap(long, default_value_t = 200, help = "Gibbs sampling sweeps per model")]
    iterations: usize,
    #[clap(long, help = "Seed for reproducible fits")]
    seed: Option<u64>,
    #[clap(long = "prefix", help = "Corpus name prefix to process (repeatable, default: tests/ and constructs)")]
    prefixes: Vec<String>,
    #[clap(long = "stop-word", help = "Additional stop word (repeatable)")]
    stop_words: Vec<String>,
    #[clap(long, help = "Skip writing the topic term tables and summaries")]
    no_tables: bool,
    #[clap(long, help = "Also plot coherence against the number of topics")]
    plot_trace: bool,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let mut extra_stop_words = defaults.extra_stop_words.clone();
        extra_stop_words.extend(self.stop_words.into_iter().map(|w| w.to_lowercase()));

        PipelineConfig {
            data_dir: self.data_dir,
            output_dir: self.output_dir,
            corpus_prefixes: if self.prefixes.is_empty() { defaults.corpus_prefixes.clone() } else { self.prefixes },
            extra_stop_words,
            topics_min: self.min_topics,
            topics_max: self.max_topics,
            top_terms: self.top_terms,
            iterations: self.iterations,
            seed: self.seed,
            write_tables: !self.no_tables,
            plot_trace: self.plot_trace,
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("corpus_topics=info")),
        )
        .init();

    let config = Args::parse().into_config();
    config.validate()?;

    let entries = corpus::discover(&config.data_dir, &config.corpus_prefixes)
        .with_context(|| format!("Failed to scan {}", config.data_dir.display()))?;
    info!(data_dir = %config.data_dir.display(), corpora = entries.len(), "Found corpora");

    let failed = process_corpora(&entries, &config);

    if failed > 0 {
        anyhow::bail!("{failed} of {} corpora failed", entries.len());
    }
    info!("Done!");
    Ok(())
}
