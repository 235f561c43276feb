use std::collections::HashSet;

use crate::catalog::{Product, ProductId};
use crate::similarity::cosine_similarity;
use crate::snapshot::CatalogSnapshot;
use crate::tfidf::TermWeights;

#[derive(Debug, Clone)]
pub struct ScoredProduct<'a> {
    pub product: &'a Product,
    /// Average cosine similarity against the reference vectors.
    pub score: f64,
    /// Distinct keywords shared with the reference products; breaks score ties.
    pub shared_terms: usize,
}

/// Scores every catalog product outside `reference` by its average similarity to the
/// reference products, best first.
///
/// Ties on score go to the candidate sharing more distinct keywords with the reference
/// products, then to catalog order. Reference ids missing from the catalog are skipped;
/// if none resolve, nothing is scored.
pub fn score_candidates<'a>(snapshot: &'a CatalogSnapshot, reference: &[ProductId]) -> Vec<ScoredProduct<'a>> {
    if reference.is_empty() {
        return vec![];
    }
    let mut reference_vectors: Vec<&TermWeights> = Vec::with_capacity(reference.len());
    let mut reference_terms: HashSet<&str> = HashSet::new();
    for &id in reference {
        match (snapshot.vector(id), snapshot.product(id)) {
            (Some(vector), Some(product)) => {
                reference_vectors.push(vector);
                reference_terms.extend(product.keywords.iter().map(String::as_str).filter(|k| !k.is_empty()));
            }
            _ => tracing::warn!(product_id = id, "reference product not in catalog; skipped"),
        }
    }
    if reference_vectors.is_empty() {
        return vec![];
    }

    let excluded: HashSet<ProductId> = reference.iter().copied().collect();
    let n = reference_vectors.len() as f64;
    let mut scored: Vec<ScoredProduct<'a>> = snapshot
        .products()
        .filter(|p| !excluded.contains(&p.id))
        .filter_map(|p| {
            let vector = snapshot.vector(p.id)?;
            let total: f64 = reference_vectors.iter().map(|r| cosine_similarity(r, vector)).sum();
            let own: HashSet<&str> = p.keywords.iter().map(String::as_str).collect();
            let shared_terms = own.iter().filter(|k| reference_terms.contains(*k)).count();
            Some(ScoredProduct { product: p, score: total / n, shared_terms })
        })
        .collect();

    // stable sort: equal keys keep catalog order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| b.shared_terms.cmp(&a.shared_terms)));
    scored
}

/// Top `top_k` content-based recommendations for a reference set.
pub fn recommend<'a>(snapshot: &'a CatalogSnapshot, reference: &[ProductId], top_k: usize) -> Vec<&'a Product> {
    score_candidates(snapshot, reference).into_iter().take(top_k).map(|s| s.product).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};

    fn product(id: ProductId, name: &str) -> Product {
        Product { id, name: name.into(), description: String::new(), image: None, keywords: vec![] }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::build(Catalog {
            categories: vec![
                Category { name: "laptop".into(), products: vec![product(1, "gaming laptop"), product(2, "office laptop"), product(3, "gaming mouse")] },
                Category { name: "audio".into(), products: vec![product(4, "wireless headphones"), product(5, "wired headphones")] },
            ],
        })
    }

    #[test]
    fn empty_reference_yields_nothing() {
        let s = snapshot();
        assert!(recommend(&s, &[], 10).is_empty());
        assert!(recommend(&s, &[42], 10).is_empty());
    }

    #[test]
    fn never_returns_reference_products() {
        let s = snapshot();
        let recs = recommend(&s, &[1, 4, 77], 10);
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|p| p.id != 1 && p.id != 4));
    }

    #[test]
    fn ranks_by_average_similarity() {
        let s = snapshot();
        let scored = score_candidates(&s, &[4]);
        assert_eq!(scored[0].product.id, 5);
        assert!(scored[0].score > 0.0);
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn truncates_to_top_k() {
        let s = snapshot();
        assert_eq!(recommend(&s, &[1], 2).len(), 2);
    }
}
