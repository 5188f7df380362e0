use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::dictionary::{BagOfWords, Dictionary};
use crate::lda::LdaModel;

const EPSILON: f64 = 1e-12;

/// Inverted index of term ids to the sorted ids of the documents holding
/// them, used for UMass probabilities.
pub struct DocumentSets {
    postings: HashMap<usize, Vec<usize>>,
    num_docs: usize,
}

impl DocumentSets {
    pub fn new(corpus: &[BagOfWords]) -> Self {
        let mut postings: HashMap<usize, Vec<usize>> = HashMap::new();
        for (doc_id, bow) in corpus.iter().enumerate() {
            for &(term, count) in bow {
                if count == 0 {
                    continue;
                }
                let docs = postings.entry(term).or_default();
                if docs.last() != Some(&doc_id) {
                    docs.push(doc_id);
                }
            }
        }
        DocumentSets { postings, num_docs: corpus.len() }
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    fn docs_of(&self, term: usize) -> &[usize] {
        self.postings.get(&term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc_count(&self, term: usize) -> usize {
        self.docs_of(term).len()
    }

    /// Documents holding both terms: a merge of the two sorted posting lists.
    pub fn co_doc_count(&self, a: usize, b: usize) -> usize {
        let (xs, ys) = (self.docs_of(a), self.docs_of(b));
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < xs.len() && j < ys.len() {
            match xs[i].cmp(&ys[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }
}

/// UMass coherence of a ranked list of term ids: the mean over ordered pairs
/// `(w_i, w_j), j < i` of `ln((D(w_i, w_j) / D + eps) / (D(w_j) / D))`.
pub fn umass(top_terms: &[usize], sets: &DocumentSets) -> f64 {
    let num_docs = sets.num_docs() as f64;
    if num_docs == 0.0 {
        return 0.0;
    }

    let doc_counts: Vec<usize> = top_terms.iter().map(|&t| sets.doc_count(t)).collect();
    let mut total = 0.0;
    let mut pairs = 0usize;

    for i in 1..top_terms.len() {
        for j in 0..i {
            if doc_counts[j] == 0 {
                continue;
            }
            let co = sets.co_doc_count(top_terms[i], top_terms[j]) as f64;
            total += ((co / num_docs + EPSILON) / (doc_counts[j] as f64 / num_docs)).ln();
            pairs += 1;
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

/// Per-topic UMass coherence over each topic's `topn` most probable terms.
pub fn topic_coherences(model: &LdaModel, sets: &DocumentSets, topn: usize) -> Vec<f64> {
    (0..model.num_topics())
        .map(|topic| {
            let ids: Vec<usize> = model.topic_terms(topic, topn).into_iter().map(|(id, _)| id).collect();
            umass(&ids, sets)
        })
        .collect()
}

/// Model-level coherence: the mean topic coherence.
pub fn model_coherence(model: &LdaModel, sets: &DocumentSets, topn: usize) -> f64 {
    let scores = topic_coherences(model, sets, topn);
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredTopic {
    pub terms: Vec<(f64, String)>,  // Probability and term, most probable first
    pub coherence: f64,
}

/// Topics with their top terms, best coherence first.
pub fn top_topics(model: &LdaModel, sets: &DocumentSets, dictionary: &Dictionary, topn: usize) -> Vec<ScoredTopic> {
    let coherences = topic_coherences(model, sets, topn);

    let mut topics: Vec<ScoredTopic> = coherences
        .into_iter()
        .enumerate()
        .map(|(topic, coherence)| {
            let terms = model
                .topic_terms(topic, topn)
                .into_iter()
                .filter_map(|(id, prob)| dictionary.token(id).map(|t| (prob, t.to_string())))
                .collect();
            ScoredTopic { terms, coherence }
        })
        .collect();

    topics.sort_by(|a, b| b.coherence.total_cmp(&a.coherence));
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(docs: &[&[usize]]) -> DocumentSets {
        let corpus: Vec<BagOfWords> = docs.iter().map(|d| d.iter().map(|&t| (t, 1)).collect()).collect();
        DocumentSets::new(&corpus)
    }

    #[test]
    fn always_cooccurring_terms_score_zero() {
        let s = sets(&[&[0, 1], &[0, 1], &[0, 1, 2]]);
        let score = umass(&[0, 1], &s);
        assert!(score.abs() < 1e-9, "got {score}");
    }

    #[test]
    fn never_cooccurring_terms_score_very_low() {
        let s = sets(&[&[0], &[1], &[0], &[1]]);
        assert!(umass(&[0, 1], &s) < -20.0);
    }

    #[test]
    fn conditional_direction_follows_rank() {
        // Term 1 appears in 2 docs, always alongside term 0, which appears in 4.
        let s = sets(&[&[0, 1], &[0, 1], &[0], &[0]]);
        let expected = ((2.0 / 4.0 + EPSILON) / (4.0 / 4.0)).ln();
        assert!((umass(&[0, 1], &s) - expected).abs() < 1e-9);
    }

    #[test]
    fn document_counts_come_from_sorted_postings() {
        let s = sets(&[&[0, 2], &[1, 2], &[0, 1, 2], &[3], &[0, 2]]);
        assert_eq!(s.num_docs(), 5);
        assert_eq!(s.doc_count(0), 3);
        assert_eq!(s.doc_count(2), 4);
        assert_eq!(s.doc_count(7), 0);
        assert_eq!(s.co_doc_count(0, 2), 3);
        assert_eq!(s.co_doc_count(2, 0), 3);
        assert_eq!(s.co_doc_count(0, 1), 1);
        assert_eq!(s.co_doc_count(1, 3), 0);
        assert_eq!(s.co_doc_count(0, 7), 0);
    }

    #[test]
    fn zero_counts_are_not_occurrences() {
        let corpus: Vec<BagOfWords> = vec![vec![(0, 1), (1, 0)], vec![(1, 2)]];
        let s = DocumentSets::new(&corpus);
        assert_eq!(s.doc_count(1), 1);
        assert_eq!(s.co_doc_count(0, 1), 0);
    }

    #[test]
    fn single_term_topic_scores_zero() {
        let s = sets(&[&[0]]);
        assert_eq!(umass(&[0], &s), 0.0);
    }
}
