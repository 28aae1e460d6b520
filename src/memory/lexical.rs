//! Lexical candidate generation with BM25 Okapi.
//!
//! The index is a derived view over node text. It remembers the store
//! revision it was built at; the owner rebuilds it whenever that revision
//! falls behind, so metadata-only updates are picked up as well as new nodes.

use std::collections::{BTreeMap, HashMap};

use crate::memory::types::NodeId;

/// BM25 Okapi tuning constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Document-length normalization strength.
    pub b: f64,
    /// Fraction of the mean idf assigned to terms whose raw idf is negative.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            epsilon: 0.25,
        }
    }
}

/// Split text into case-folded tokens: maximal runs of alphanumeric or `_` characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Term statistics for one corpus snapshot.
#[derive(Debug, Default)]
struct Bm25 {
    doc_freqs: Vec<HashMap<String, usize>>,
    doc_len: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl Bm25 {
    fn build(corpus: &[Vec<String>], params: &Bm25Params) -> Self {
        let mut doc_freqs = Vec::with_capacity(corpus.len());
        let mut doc_len = Vec::with_capacity(corpus.len());
        // term -> number of documents containing it
        let mut containing: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_tokens = 0usize;

        for document in corpus {
            doc_len.push(document.len());
            total_tokens += document.len();

            let mut frequencies: HashMap<String, usize> = HashMap::new();
            for token in document {
                *frequencies.entry(token.clone()).or_insert(0) += 1;
            }
            for token in frequencies.keys() {
                *containing.entry(token.clone()).or_insert(0) += 1;
            }
            doc_freqs.push(frequencies);
        }

        let n = corpus.len() as f64;
        let avgdl = if corpus.is_empty() {
            0.0
        } else {
            total_tokens as f64 / n
        };

        let mut idf: HashMap<String, f64> = HashMap::with_capacity(containing.len());
        let mut idf_sum = 0.0;
        let mut negative: Vec<String> = Vec::new();
        for (term, df) in containing {
            let df = df as f64;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = params.epsilon * (idf_sum / idf.len() as f64);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            doc_freqs,
            doc_len,
            avgdl,
            idf,
        }
    }

    fn scores(&self, query: &[String], params: &Bm25Params) -> Vec<f64> {
        let mut scores = vec![0.0; self.doc_freqs.len()];
        for term in query {
            let Some(&idf) = self.idf.get(term) else {
                continue;
            };
            for (doc, frequencies) in self.doc_freqs.iter().enumerate() {
                let Some(&tf) = frequencies.get(term) else {
                    continue;
                };
                let tf = tf as f64;
                let length_ratio = if self.avgdl > 0.0 {
                    self.doc_len[doc] as f64 / self.avgdl
                } else {
                    0.0
                };
                let norm = params.k1 * (1.0 - params.b + params.b * length_ratio);
                scores[doc] += idf * (tf * (params.k1 + 1.0)) / (tf + norm);
            }
        }
        scores
    }
}

/// Rebuildable BM25 view over `(node id, text)` pairs.
#[derive(Debug)]
pub struct LexicalIndex {
    params: Bm25Params,
    ids: Vec<NodeId>,
    bm25: Bm25,
    built_at: Option<u64>,
}

impl LexicalIndex {
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ids: Vec::new(),
            bm25: Bm25::default(),
            built_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `true` if the index was never built or was built at another revision.
    pub fn is_stale(&self, revision: u64) -> bool {
        self.built_at != Some(revision)
    }

    /// Re-tokenize the whole corpus. Document positions follow the iteration order.
    pub fn rebuild<I>(&mut self, documents: I, revision: u64)
    where
        I: IntoIterator<Item = (NodeId, String)>,
    {
        let (ids, corpus): (Vec<NodeId>, Vec<Vec<String>>) = documents
            .into_iter()
            .map(|(id, text)| (id, tokenize(&text)))
            .unzip();

        self.bm25 = Bm25::build(&corpus, &self.params);
        self.ids = ids;
        self.built_at = Some(revision);

        tracing::debug!(documents = self.ids.len(), revision, "lexical index rebuilt");
    }

    /// BM25 score for every document, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        self.bm25.scores(&tokenize(query), &self.params)
    }

    /// The `k` best-scoring node ids, highest first.
    ///
    /// Ties keep corpus order. Zero-score documents are still returned when
    /// fewer than `k` documents match.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<NodeId> {
        if self.ids.is_empty() || k == 0 {
            return Vec::new();
        }
        let scores = self.scores(query);
        let mut ranked: Vec<usize> = (0..self.ids.len()).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        ranked
            .into_iter()
            .take(k)
            .map(|i| self.ids[i].clone())
            .collect()
    }
}
