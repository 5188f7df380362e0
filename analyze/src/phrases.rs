use std::collections::HashSet;

use counter::Counter;
use tracing::debug;

/// Words that may sit inside a phrase ("theory_of_mind") but never start or end one.
pub const ENGLISH_CONNECTOR_WORDS: &[&str] = &[
    "a", "an", "the", "for", "of", "with", "without", "at", "from", "to", "in", "on", "by", "and", "or",
];

pub const PHRASE_DELIMITER: &str = "_";

/// Collocation detector: learns how often adjacent terms co-occur and merges
/// pairs scoring above a threshold into a single `a_b` token.
pub struct Phrases {
    vocab: Counter<String>,
    connectors: HashSet<&'static str>,
    min_count: usize,
    threshold: f64,
}

impl Phrases {
    pub fn learn(docs: &[Vec<String>], min_count: usize, threshold: f64) -> Self {
        let mut phrases = Phrases {
            vocab: Counter::new(),
            connectors: ENGLISH_CONNECTOR_WORDS.iter().copied().collect(),
            min_count,
            threshold,
        };

        for doc in docs {
            let mut start: Option<&str> = None;
            let mut in_between: Vec<&str> = Vec::new();

            for word in doc {
                phrases.vocab[word] += 1;
                if phrases.is_connector(word) {
                    if start.is_some() {
                        in_between.push(word.as_str());
                    }
                } else {
                    if let Some(first) = start {
                        let phrase = join_phrase(first, &in_between, word);
                        phrases.vocab[&phrase] += 1;
                    }
                    start = Some(word.as_str());
                    in_between.clear();
                }
            }
        }

        phrases
    }

    fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(word)
    }

    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    pub fn count(&self, token: &str) -> usize {
        self.vocab.get(token).copied().unwrap_or(0)
    }

    /// Score of joining `first`, `in_between` and `last`, if it passes the threshold.
    pub fn score(&self, first: &str, in_between: &[&str], last: &str) -> Option<(String, f64)> {
        let first_count = self.count(first);
        let last_count = self.count(last);
        if first_count == 0 || last_count == 0 {
            return None;
        }

        let phrase = join_phrase(first, in_between, last);
        let phrase_count = self.count(&phrase);
        if phrase_count == 0 {
            return None;
        }

        let score = (phrase_count as f64 - self.min_count as f64) / first_count as f64 / last_count as f64
            * self.vocab_len() as f64;

        if score > self.threshold {
            Some((phrase, score))
        } else {
            None
        }
    }

    /// Greedily merge phrases in one document, left to right.
    pub fn apply(&self, doc: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(doc.len());
        let mut start: Option<&str> = None;
        let mut in_between: Vec<&str> = Vec::new();

        for word in doc {
            if self.is_connector(word) {
                match start {
                    Some(_) => in_between.push(word.as_str()),
                    None => out.push(word.clone()),
                }
                continue;
            }

            match start {
                Some(first) => match self.score(first, &in_between, word) {
                    Some((phrase, _)) => {
                        out.push(phrase);
                        start = None;
                        in_between.clear();
                    }
                    None => {
                        out.push(first.to_string());
                        out.extend(in_between.drain(..).map(str::to_string));
                        start = Some(word.as_str());
                    }
                },
                None => {
                    start = Some(word.as_str());
                    in_between.clear();
                }
            }
        }

        if let Some(first) = start {
            out.push(first.to_string());
            out.extend(in_between.into_iter().map(str::to_string));
        }

        out
    }

    pub fn apply_all(&self, docs: &[Vec<String>]) -> Vec<Vec<String>> {
        docs.iter().map(|doc| self.apply(doc)).collect()
    }
}

fn join_phrase(first: &str, in_between: &[&str], last: &str) -> String {
    let mut parts = Vec::with_capacity(in_between.len() + 2);
    parts.push(first);
    parts.extend_from_slice(in_between);
    parts.push(last);
    parts.join(PHRASE_DELIMITER)
}

/// Number of phrase models learned for a corpus. Test and construct names can
/// run to four words, so longer names get extra relearning rounds.
pub fn pass_count(corpus_name: &str) -> usize {
    let spaces = corpus_name.matches(' ').count();
    1 + std::cmp::max(1, 2 + spaces)
}

/// Learn a phrase model on the raw documents, then relearn it on its own
/// output a few times. Every round learns from the previous model applied once
/// to `docs`, and only the final model is applied, once, to `docs`.
pub fn detect(docs: Vec<Vec<String>>, corpus_name: &str, min_count: usize, threshold: f64) -> Vec<Vec<String>> {
    let passes = pass_count(corpus_name);
    let mut model = Phrases::learn(&docs, min_count, threshold);
    debug!(corpus = corpus_name, pass = 0, vocab = model.vocab_len(), "Phrase pass");

    for pass in 1..passes {
        let merged = model.apply_all(&docs);
        model = Phrases::learn(&merged, min_count, threshold);
        debug!(corpus = corpus_name, pass, vocab = model.vocab_len(), "Phrase pass");
    }

    model.apply_all(&docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str], copies: usize) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        for _ in 0..copies {
            for line in raw {
                out.push(line.split_whitespace().map(str::to_string).collect());
            }
        }
        out
    }

    #[test]
    fn merges_frequent_pair() {
        let corpus = docs(
            &[
                "working memory capacity",
                "working memory load",
                "visual attention span",
                "executive control network",
                "reaction time variability",
            ],
            10,
        );
        let model = Phrases::learn(&corpus, 5, 0.5);
        let merged = model.apply(&corpus[0]);
        assert_eq!(merged[0], "working_memory");
    }

    #[test]
    fn rare_pairs_stay_apart() {
        let corpus = docs(&["alpha beta", "gamma delta"], 2);
        let model = Phrases::learn(&corpus, 5, 10.0);
        assert_eq!(model.apply(&corpus[0]), vec!["alpha", "beta"]);
    }

    #[test]
    fn connectors_never_start_a_phrase() {
        let corpus = docs(&["of theory of mind", "theory of mind deficit", "social cognition"], 10);
        let model = Phrases::learn(&corpus, 5, 0.1);
        let merged = model.apply(&corpus[0]);
        assert_eq!(merged[0], "of");
        assert_eq!(merged[1], "theory_of_mind");
    }

    #[test]
    fn apply_preserves_unmerged_tokens() {
        let corpus = docs(&["one two three"], 1);
        let model = Phrases::learn(&corpus, 5, 10.0);
        assert_eq!(model.apply(&corpus[0]), corpus[0]);
    }

    #[test]
    fn pass_count_grows_with_name_length() {
        assert_eq!(pass_count("tests/Stroop"), 3);
        assert_eq!(pass_count("tests/Go NoGo"), 4);
        assert_eq!(pass_count("constructs/theory of mind"), 5);
    }

    #[test]
    fn detect_applies_only_the_final_model_to_raw_documents() {
        let raw = [
            "stop signal reaction time",
            "memory span",
            "attention network",
            "cognitive flexibility",
            "response inhibition",
        ];

        // Models alternate: one trained on raw text merges pairs, the next one
        // only knows merged tokens and leaves raw text alone.
        let out = detect(docs(&raw, 10), "tests/Stroop", 5, 0.2);
        assert_eq!(out[0], vec!["stop_signal", "reaction_time"]);
        assert_eq!(out[1], vec!["memory_span"]);

        let out = detect(docs(&raw, 10), "tests/Stop Signal", 5, 0.2);
        assert_eq!(out[0], vec!["stop", "signal", "reaction", "time"]);
        assert_eq!(out[1], vec!["memory", "span"]);
    }

    #[test]
    fn detect_never_merges_beyond_pairs_of_raw_tokens() {
        let raw = ["working memory capacity limit", "visual search", "motor timing"];
        let out = detect(docs(&raw, 10), "tests/Corsi", 5, 0.2);
        assert!(out.iter().flatten().all(|token| token.matches(PHRASE_DELIMITER).count() <= 1));
    }
}
