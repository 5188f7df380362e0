// Topic modeling over cognitive test/construct abstract corpora.
//
// Each corpus is a CSV of paper titles and abstracts. The pipeline cleans the
// text, merges collocations into phrases, fits a sweep of LDA models, keeps the
// most coherent one and renders its topics as bar charts and word clouds.

pub mod coherence;
pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod lda;
pub mod phrases;
pub mod pipeline;
pub mod preprocess;
pub mod render;
pub mod selection;
pub mod table;

pub use config::PipelineConfig;
pub use error::{Result, TopicsError};
