use serde::Serialize;
use std::collections::HashMap;

use crate::catalog::Catalog;

pub type TermId = u32;

/// Distinct non-empty keywords across a catalog. Term ids follow first appearance in
/// flattened catalog order, so a given catalog always yields the same ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    #[serde(skip)]
    dictionary: HashMap<String, TermId>,
}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    /// Expects keywords to be populated already (see `tokenizer::build_keywords`).
    pub fn build(catalog: &Catalog) -> Self {
        let mut vocab = Self::new();
        for product in catalog.products() {
            for keyword in &product.keywords {
                vocab.insert(keyword);
            }
        }
        vocab
    }

    fn insert(&mut self, term: &str) -> Option<TermId> {
        if term.is_empty() {
            return None;
        }
        if let Some(&tid) = self.dictionary.get(term) {
            return Some(tid);
        }
        let tid = self.terms.len() as TermId;
        self.terms.push(term.to_string());
        self.dictionary.insert(term.to_string(), tid);
        Some(tid)
    }

    pub fn id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}
