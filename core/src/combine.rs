use std::collections::HashSet;

use crate::catalog::{Product, ProductId};

/// Concatenates recommendation lists in the given order and drops repeated product ids,
/// keeping the first occurrence.
pub fn combine<'a, I>(lists: I) -> Vec<&'a Product>
where
    I: IntoIterator<Item = Vec<&'a Product>>,
{
    let mut seen: HashSet<ProductId> = HashSet::new();
    lists.into_iter().flatten().filter(|p| seen.insert(p.id)).collect()
}
