use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, ProductId};
use crate::vocabulary::{TermId, Vocabulary};

/// Sparse term -> weight vector, sorted by term id. Absent terms weigh 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermWeights {
    entries: Vec<(TermId, f64)>,
}

impl TermWeights {
    pub fn new() -> Self { Self::default() }

    /// Builds a vector from (term, weight) pairs in any order. For a repeated term the first pair wins.
    pub fn from_pairs<I: IntoIterator<Item = (TermId, f64)>>(pairs: I) -> Self {
        let mut entries: Vec<(TermId, f64)> = pairs.into_iter().collect();
        entries.sort_by_key(|(tid, _)| *tid);
        entries.dedup_by_key(|(tid, _)| *tid);
        Self { entries }
    }

    pub fn get(&self, term: TermId) -> f64 {
        match self.entries.binary_search_by_key(&term, |(tid, _)| *tid) {
            Ok(i) => self.entries[i].1,
            Err(_) => 0.0,
        }
    }

    pub fn as_slice(&self) -> &[(TermId, f64)] { &self.entries }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ { self.entries.iter().copied() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Sum of squared weights, i.e. the squared Euclidean norm.
    pub fn norm_squared(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum()
    }
}

/// Fraction of `keywords` equal to `term`. An empty keyword list has frequency 0 for every term.
pub fn term_frequency(keywords: &[String], term: &str) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let count = keywords.iter().filter(|k| k.as_str() == term).count();
    count as f64 / keywords.len() as f64
}

/// log10(total_docs / (1 + docs_with_term)). Defined as 0 for an empty corpus.
pub fn inverse_document_frequency(total_docs: usize, docs_with_term: usize) -> f64 {
    if total_docs == 0 {
        return 0.0;
    }
    (total_docs as f64 / (1.0 + docs_with_term as f64)).log10()
}

/// Term frequencies of one product over the vocabulary. Only terms that occur are stored.
pub fn compute_tf(keywords: &[String], vocab: &Vocabulary) -> TermWeights {
    if keywords.is_empty() {
        return TermWeights::new();
    }
    let mut counts: HashMap<TermId, u32> = HashMap::new();
    for keyword in keywords {
        if let Some(tid) = vocab.id(keyword) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    let len = keywords.len() as f64;
    TermWeights::from_pairs(counts.into_iter().map(|(tid, c)| (tid, c as f64 / len)))
}

/// IDF weight per vocabulary term, indexed by term id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdfTable {
    pub num_docs: usize,
    pub df: Vec<u32>,
    pub weights: Vec<f64>,
}

impl IdfTable {
    pub fn get(&self, term: TermId) -> f64 { self.weights.get(term as usize).copied().unwrap_or(0.0) }
}

pub fn compute_idf(catalog: &Catalog, vocab: &Vocabulary) -> IdfTable {
    let num_docs = catalog.len();
    let mut df: Vec<u32> = vec![0; vocab.len()];
    for product in catalog.products() {
        let seen_in_doc: HashSet<TermId> = product.keywords.iter().filter_map(|k| vocab.id(k)).collect();
        for tid in seen_in_doc {
            df[tid as usize] += 1;
        }
    }
    let weights = df.iter().map(|&d| inverse_document_frequency(num_docs, d as usize)).collect();
    IdfTable { num_docs, df, weights }
}

pub fn compute_tfidf(tf: &TermWeights, idf: &IdfTable) -> TermWeights {
    TermWeights::from_pairs(tf.iter().map(|(tid, w)| (tid, w * idf.get(tid))))
}

/// One TF-IDF vector per product, keyed by product id.
pub fn vectorize(catalog: &Catalog, vocab: &Vocabulary, idf: &IdfTable) -> HashMap<ProductId, TermWeights> {
    let mut vectors = HashMap::with_capacity(catalog.len());
    for product in catalog.products() {
        if product.keywords.is_empty() {
            tracing::warn!(product_id = product.id, "product has no keywords; using zero vector");
        }
        let tf = compute_tf(&product.keywords, vocab);
        vectors.entry(product.id).or_insert_with(|| compute_tfidf(&tf, idf));
    }
    vectors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> { words.iter().map(|w| w.to_string()).collect() }

    #[test]
    fn tf_counts_over_full_keyword_length() {
        let k = kw(&["red", "", "red", "shoes"]);
        assert_eq!(term_frequency(&k, "red"), 0.5);
        assert_eq!(term_frequency(&k, "shoes"), 0.25);
        assert_eq!(term_frequency(&k, "blue"), 0.0);
        assert_eq!(term_frequency(&[], "red"), 0.0);
    }

    #[test]
    fn idf_is_non_increasing_in_document_frequency() {
        let mut last = f64::INFINITY;
        for df in 0..=20 {
            let idf = inverse_document_frequency(20, df);
            assert!(idf <= last, "idf rose at df={df}");
            last = idf;
        }
        assert!((inverse_document_frequency(10, 0) - 1.0).abs() < 1e-12);
        assert_eq!(inverse_document_frequency(0, 0), 0.0);
    }

    #[test]
    fn sparse_lookup_defaults_to_zero() {
        let v = TermWeights::from_pairs(vec![(3, 0.5), (1, 0.25), (3, 9.0)]);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(1), 0.25);
        assert_eq!(v.get(3), 0.5);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.norm_squared(), 0.3125);
    }
}
