use std::collections::{HashMap, HashSet};

use crate::catalog::{Product, ProductId};
use crate::config::RecommenderConfig;
use crate::session::UserCarts;
use crate::snapshot::CatalogSnapshot;

/// Purchase count per product across every user's cart.
///
/// By default every cart entry counts, so a product listed twice in one cart counts twice.
/// With `distinct_buyers` each user contributes at most one to a product's count.
pub fn purchase_counts(carts: &UserCarts, distinct_buyers: bool) -> HashMap<ProductId, u32> {
    let mut counts: HashMap<ProductId, u32> = HashMap::new();
    for cart in carts.values() {
        if distinct_buyers {
            let unique: HashSet<ProductId> = cart.iter().copied().collect();
            for id in unique {
                *counts.entry(id).or_insert(0) += 1;
            }
        } else {
            for &id in cart {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Products whose purchase count reaches the configured threshold, most purchased first,
/// ties in catalog order. Ids absent from the catalog are dropped.
pub fn recommend<'a>(snapshot: &'a CatalogSnapshot, carts: &UserCarts, config: &RecommenderConfig) -> Vec<&'a Product> {
    let counts = purchase_counts(carts, config.distinct_buyers);
    let mut popular: Vec<(&'a Product, u32, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count >= config.popularity_threshold)
        .filter_map(|(id, count)| match (snapshot.product(id), snapshot.position(id)) {
            (Some(product), Some(pos)) => Some((product, count, pos)),
            _ => {
                tracing::warn!(product_id = id, "popular product not in catalog; skipped");
                None
            }
        })
        .collect();
    popular.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    popular.into_iter().map(|(p, _, _)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carts(entries: &[(&str, &[ProductId])]) -> UserCarts {
        entries.iter().map(|(u, ids)| (u.to_string(), ids.to_vec())).collect()
    }

    #[test]
    fn counts_cart_entries() {
        let c = carts(&[("an", &[7, 7, 3]), ("binh", &[7])]);
        let counts = purchase_counts(&c, false);
        assert_eq!(counts[&7], 3);
        assert_eq!(counts[&3], 1);
    }

    #[test]
    fn distinct_buyers_counts_each_user_once() {
        let c = carts(&[("an", &[7, 7, 3]), ("binh", &[7])]);
        let counts = purchase_counts(&c, true);
        assert_eq!(counts[&7], 2);
        assert_eq!(counts[&3], 1);
    }
}
