use std::collections::{HashMap, HashSet};

use counter::Counter;

/// A document as sparse `(term_id, count)` pairs sorted by id.
pub type BagOfWords = Vec<(usize, usize)>;

/// Bidirectional term/id mapping with document and collection frequencies.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    token2id: HashMap<String, usize>,
    id2token: Vec<String>,
    dfs: Vec<usize>,    // Number of documents containing each term
    cfs: Vec<usize>,    // Total occurrences of each term
    num_docs: usize,
}

impl Dictionary {
    pub fn from_documents(docs: &[Vec<String>]) -> Self {
        let mut dictionary = Dictionary::default();
        for doc in docs {
            dictionary.add_document(doc);
        }
        dictionary
    }

    pub fn add_document(&mut self, doc: &[String]) {
        let counts: Counter<&str> = doc.iter().map(String::as_str).collect();

        let mut missing: Vec<&str> = counts
            .keys()
            .filter(|token| !self.token2id.contains_key(**token))
            .copied()
            .collect();
        missing.sort_unstable();
        for token in missing {
            let id = self.id2token.len();
            self.token2id.insert(token.to_string(), id);
            self.id2token.push(token.to_string());
            self.dfs.push(0);
            self.cfs.push(0);
        }

        for (token, count) in counts.iter() {
            let id = self.token2id[*token];
            self.dfs[id] += 1;
            self.cfs[id] += *count;
        }
        self.num_docs += 1;
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.id2token.get(id).map(String::as_str)
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.token2id.get(token).copied()
    }

    pub fn doc_freq(&self, id: usize) -> usize {
        self.dfs.get(id).copied().unwrap_or(0)
    }

    pub fn collection_freq(&self, id: usize) -> usize {
        self.cfs.get(id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.id2token.iter().enumerate().map(|(id, token)| (id, token.as_str()))
    }

    /// Keep terms appearing in at least `no_below` documents and at most
    /// `no_above` (a fraction) of them, then only the `keep_n` most frequent.
    pub fn filter_extremes(&mut self, no_below: usize, no_above: f64, keep_n: usize) {
        let no_above_abs = (no_above * self.num_docs as f64) as usize;

        let mut good: Vec<usize> = (0..self.len())
            .filter(|&id| self.dfs[id] >= no_below && self.dfs[id] <= no_above_abs)
            .collect();
        good.sort_by(|a, b| self.dfs[*b].cmp(&self.dfs[*a]).then(a.cmp(b)));
        good.truncate(keep_n);

        let good: HashSet<usize> = good.into_iter().collect();
        self.retain(|id, _| good.contains(&id));
    }

    pub fn filter_tokens(&mut self, bad_ids: &HashSet<usize>) {
        self.retain(|id, _| !bad_ids.contains(&id));
    }

    /// Drop every term failing `keep`, then compact the remaining ids
    /// preserving their relative order.
    pub fn retain(&mut self, keep: impl Fn(usize, &str) -> bool) {
        let kept: Vec<usize> = (0..self.len()).filter(|&id| keep(id, &self.id2token[id])).collect();

        let id2token: Vec<String> = kept.iter().map(|&id| self.id2token[id].clone()).collect();
        self.dfs = kept.iter().map(|&id| self.dfs[id]).collect();
        self.cfs = kept.iter().map(|&id| self.cfs[id]).collect();
        self.token2id = id2token
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id))
            .collect();
        self.id2token = id2token;
    }

    pub fn doc2bow(&self, doc: &[String]) -> BagOfWords {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in doc {
            if let Some(&id) = self.token2id.get(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut bow: BagOfWords = counts.into_iter().collect();
        bow.sort_unstable();
        bow
    }
}
