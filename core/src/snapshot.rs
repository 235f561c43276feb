use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{Catalog, Product, ProductId, ProductIndex};
use crate::error::DataError;
use crate::similarity::cosine_similarity;
use crate::tfidf::{compute_idf, vectorize, IdfTable, TermWeights};
use crate::tokenizer::build_keywords;
use crate::vocabulary::Vocabulary;

/// Immutable, fully vectorized view of one catalog load.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    catalog: Catalog,
    index: ProductIndex,
    vocabulary: Vocabulary,
    idf: IdfTable,
    vectors: HashMap<ProductId, TermWeights>,
}

impl CatalogSnapshot {
    /// Normalizes keywords, builds the vocabulary and computes every product's TF-IDF vector.
    pub fn build(mut catalog: Catalog) -> Self {
        build_keywords(&mut catalog);
        let index = ProductIndex::build(&catalog);
        let vocabulary = Vocabulary::build(&catalog);
        let idf = compute_idf(&catalog, &vocabulary);
        let vectors = vectorize(&catalog, &vocabulary, &idf);
        tracing::info!(num_products = index.order().len(), num_terms = vocabulary.len(), "catalog vectorized");
        Self { catalog, index, vocabulary, idf, vectors }
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn idf(&self) -> &IdfTable { &self.idf }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        let (ci, pi) = self.index.slot(id)?;
        self.catalog.categories.get(ci)?.products.get(pi)
    }

    pub fn vector(&self, id: ProductId) -> Option<&TermWeights> { self.vectors.get(&id) }

    /// Flattened catalog position; used as the final ranking tie-break.
    pub fn position(&self, id: ProductId) -> Option<usize> { self.index.position(id) }

    /// Products in flattened catalog order.
    pub fn products(&self) -> impl Iterator<Item = &Product> { self.catalog.products() }

    pub fn len(&self) -> usize { self.index.order().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Cosine similarity between two products' vectors, `None` if either id is unknown.
    pub fn similarity(&self, a: ProductId, b: ProductId) -> Option<f64> {
        Some(cosine_similarity(self.vector(a)?, self.vector(b)?))
    }

    /// Products of one category, by exact category name.
    pub fn category_products(&self, name: &str) -> Option<&[Product]> {
        self.catalog.category(name).map(|c| c.products.as_slice())
    }

    /// Case-insensitive substring search over name and description, optionally within one category.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Product> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return vec![];
        }
        self.catalog
            .products_with_category()
            .filter(|(c, _)| category.map_or(true, |name| c.name == name))
            .map(|(_, p)| p)
            .filter(|p| p.name.to_lowercase().contains(&q) || p.description.to_lowercase().contains(&q))
            .collect()
    }
}

/// Result of loading the catalog: distinguishes "never loaded" and "load failed" from an
/// empty but valid catalog.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    NotLoaded,
    Failed(Arc<DataError>),
    Loaded(Arc<CatalogSnapshot>),
}

impl CatalogState {
    pub fn from_result(result: Result<Catalog, DataError>) -> Self {
        match result {
            Ok(catalog) => CatalogState::Loaded(Arc::new(CatalogSnapshot::build(catalog))),
            Err(e) => {
                tracing::error!(error = %e, "catalog load failed");
                CatalogState::Failed(Arc::new(e))
            }
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<CatalogSnapshot>> {
        match self {
            CatalogState::Loaded(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool { matches!(self, CatalogState::Loaded(_)) }
}
