use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dictionary::BagOfWords;

pub struct LDAConfig {
    pub num_topics: usize,
    pub iterations: usize,
    pub alpha: f64,  // Document-topic concentration
    pub eta: f64,    // Topic-term concentration
    pub seed: Option<u64>,
}

impl LDAConfig {
    /// Symmetric `1 / num_topics` priors.
    pub fn with_topics(num_topics: usize) -> Self {
        let prior = 1.0 / num_topics.max(1) as f64;
        LDAConfig {
            num_topics,
            iterations: 200,
            alpha: prior,
            eta: prior,
            seed: None,
        }
    }
}

impl Default for LDAConfig {
    fn default() -> Self {
        LDAConfig::with_topics(10)
    }
}

/// A fitted latent Dirichlet allocation model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    num_topics: usize,
    num_terms: usize,
    topic_term: Vec<Vec<f64>>,  // Topics x Terms, rows sum to 1
    doc_topic: Vec<Vec<f64>>,   // Documents x Topics, rows sum to 1
}

impl LdaModel {
    /// Fit by collapsed Gibbs sampling over the bag-of-words corpus.
    pub fn fit(corpus: &[BagOfWords], num_terms: usize, config: &LDAConfig) -> LdaModel {
        let num_topics = config.num_topics.max(1);
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Expand each document into one term id per occurrence.
        let docs: Vec<Vec<usize>> = corpus
            .iter()
            .map(|bow| {
                bow.iter()
                    .flat_map(|&(term, count)| std::iter::repeat(term).take(count))
                    .collect()
            })
            .collect();

        let mut term_topic_counts = vec![vec![0usize; num_topics]; num_terms];
        let mut doc_topic_counts = vec![vec![0usize; num_topics]; docs.len()];
        let mut topic_counts = vec![0usize; num_topics];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());

        for (doc_id, doc) in docs.iter().enumerate() {
            let mut doc_assignments = Vec::with_capacity(doc.len());
            for &term in doc {
                let topic = rng.gen_range(0..num_topics);
                term_topic_counts[term][topic] += 1;
                doc_topic_counts[doc_id][topic] += 1;
                topic_counts[topic] += 1;
                doc_assignments.push(topic);
            }
            assignments.push(doc_assignments);
        }

        let eta_sum = num_terms as f64 * config.eta;
        let mut weights = vec![0.0; num_topics];

        for _ in 0..config.iterations {
            for (doc_id, doc) in docs.iter().enumerate() {
                for (pos, &term) in doc.iter().enumerate() {
                    let old = assignments[doc_id][pos];
                    term_topic_counts[term][old] -= 1;
                    doc_topic_counts[doc_id][old] -= 1;
                    topic_counts[old] -= 1;

                    let mut total = 0.0;
                    for topic in 0..num_topics {
                        let w = (doc_topic_counts[doc_id][topic] as f64 + config.alpha)
                            * (term_topic_counts[term][topic] as f64 + config.eta)
                            / (topic_counts[topic] as f64 + eta_sum);
                        total += w;
                        weights[topic] = total;
                    }

                    let draw = rng.gen::<f64>() * total;
                    let new = weights.iter().position(|&c| draw < c).unwrap_or(num_topics - 1);

                    term_topic_counts[term][new] += 1;
                    doc_topic_counts[doc_id][new] += 1;
                    topic_counts[new] += 1;
                    assignments[doc_id][pos] = new;
                }
            }
        }

        let topic_term = (0..num_topics)
            .map(|topic| {
                (0..num_terms)
                    .map(|term| {
                        (term_topic_counts[term][topic] as f64 + config.eta) / (topic_counts[topic] as f64 + eta_sum)
                    })
                    .collect()
            })
            .collect();

        let alpha_sum = num_topics as f64 * config.alpha;
        let doc_topic = doc_topic_counts
            .iter()
            .map(|counts| {
                let total: usize = counts.iter().sum();
                counts
                    .iter()
                    .map(|&c| (c as f64 + config.alpha) / (total as f64 + alpha_sum))
                    .collect()
            })
            .collect();

        LdaModel {
            num_topics,
            num_terms,
            topic_term,
            doc_topic,
        }
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    pub fn topics(&self) -> &[Vec<f64>] {
        &self.topic_term
    }

    pub fn doc_topics(&self, doc_id: usize) -> Option<&[f64]> {
        self.doc_topic.get(doc_id).map(Vec::as_slice)
    }

    /// The `topn` most probable terms of `topic`, most probable first.
    pub fn topic_terms(&self, topic: usize, topn: usize) -> Vec<(usize, f64)> {
        let Some(row) = self.topic_term.get(topic) else {
            return Vec::new();
        };
        let mut terms: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        terms.truncate(topn);
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Twenty documents over terms 0..5 and twenty over terms 5..10.
    fn two_theme_corpus() -> Vec<BagOfWords> {
        let mut corpus = Vec::new();
        for i in 0..20 {
            let base = if i % 2 == 0 { 0 } else { 5 };
            corpus.push((base..base + 5).map(|t| (t, 3)).collect());
        }
        corpus
    }

    fn config(num_topics: usize) -> LDAConfig {
        LDAConfig {
            seed: Some(7),
            ..LDAConfig::with_topics(num_topics)
        }
    }

    #[test]
    fn topic_rows_are_distributions() {
        let model = LdaModel::fit(&two_theme_corpus(), 10, &config(3));
        assert_eq!(model.topics().len(), 3);
        for row in model.topics() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row sums to {sum}");
        }
        let theta: f64 = model.doc_topics(0).unwrap().iter().sum();
        assert!((theta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn separates_disjoint_themes() {
        let model = LdaModel::fit(&two_theme_corpus(), 10, &config(2));
        let first: Vec<usize> = model.topic_terms(0, 5).into_iter().map(|(t, _)| t).collect();
        let second: Vec<usize> = model.topic_terms(1, 5).into_iter().map(|(t, _)| t).collect();

        let theme = |terms: &[usize]| terms.iter().all(|&t| t < 5) || terms.iter().all(|&t| t >= 5);
        assert!(theme(&first), "mixed topic {first:?}");
        assert!(theme(&second), "mixed topic {second:?}");
        assert_ne!(first[0] < 5, second[0] < 5);
    }

    #[test]
    fn seeded_fits_are_reproducible() {
        let a = LdaModel::fit(&two_theme_corpus(), 10, &config(4));
        let b = LdaModel::fit(&two_theme_corpus(), 10, &config(4));
        assert_eq!(a.topics(), b.topics());
    }

    #[test]
    fn topic_terms_are_sorted_and_truncated() {
        let model = LdaModel::fit(&two_theme_corpus(), 10, &config(2));
        let terms = model.topic_terms(0, 3);
        assert_eq!(terms.len(), 3);
        assert!(terms.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(model.topic_terms(9, 3).is_empty());
    }
}
