use std::cmp::Ordering;

use crate::tfidf::TermWeights;

/// Sum of a[t] * b[t] over shared terms. Walks both sorted vectors in term order, so the
/// result does not depend on argument order.
pub fn dot(a: &TermWeights, b: &TermWeights) -> f64 {
    let (a, b) = (a.as_slice(), b.as_slice());
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// Cosine similarity of two term-weight vectors; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &TermWeights, b: &TermWeights) -> f64 {
    let na = a.norm_squared();
    let nb = b.norm_squared();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot(a, b) / (na * nb).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(pairs: &[(u32, f64)]) -> TermWeights { TermWeights::from_pairs(pairs.iter().copied()) }

    #[test]
    fn symmetric() {
        let a = v(&[(0, 0.3), (2, 0.11), (5, 0.7)]);
        let b = v(&[(1, 0.4), (2, 0.9), (5, 0.05), (7, 0.2)]);
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn self_similarity_is_one() {
        let a = v(&[(0, 0.176), (3, 0.0587), (4, 0.301)]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let a = v(&[(0, 0.5)]);
        let zero = v(&[(0, 0.0), (1, 0.0)]);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
        assert_eq!(cosine_similarity(&TermWeights::new(), &a), 0.0);
    }

    #[test]
    fn disjoint_vectors_score_zero() {
        let a = v(&[(0, 1.0)]);
        let b = v(&[(1, 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
