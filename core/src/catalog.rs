use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::DataError;

pub type ProductId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Normalized tokens from name, description and category name, filled in by `build_keywords`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    /// Products in flattened order: every product of the first category, then the second, and so on.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|c| c.products.iter())
    }

    /// Products paired with the category they belong to, in flattened order.
    pub fn products_with_category(&self) -> impl Iterator<Item = (&Category, &Product)> {
        self.categories.iter().flat_map(|c| c.products.iter().map(move |p| (c, p)))
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Product ids must be unique across all categories.
    pub fn validate(&self) -> Result<(), DataError> {
        let mut seen: HashSet<ProductId> = HashSet::new();
        for p in self.products() {
            if !seen.insert(p.id) {
                return Err(DataError::DuplicateProduct(p.id));
            }
        }
        Ok(())
    }
}

/// Position of a product inside the catalog: (category index, product index within category).
pub type ProductSlot = (usize, usize);

/// Identifier-keyed lookup over a catalog, plus the flattened order used for tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    slots: HashMap<ProductId, (ProductSlot, usize)>,
    order: Vec<ProductId>,
}

impl ProductIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut slots = HashMap::new();
        let mut order = Vec::with_capacity(catalog.len());
        for (ci, category) in catalog.categories.iter().enumerate() {
            for (pi, product) in category.products.iter().enumerate() {
                // first occurrence wins; duplicates are rejected earlier by `Catalog::validate`
                if !slots.contains_key(&product.id) {
                    slots.insert(product.id, ((ci, pi), order.len()));
                    order.push(product.id);
                }
            }
        }
        Self { slots, order }
    }

    pub fn slot(&self, id: ProductId) -> Option<ProductSlot> { self.slots.get(&id).map(|(s, _)| *s) }

    pub fn contains(&self, id: ProductId) -> bool { self.slots.contains_key(&id) }

    /// Product ids in flattened catalog order.
    pub fn order(&self) -> &[ProductId] { &self.order }

    /// Flattened position of a product, if present.
    pub fn position(&self, id: ProductId) -> Option<usize> { self.slots.get(&id).map(|(_, pos)| *pos) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: ProductId, name: &str) -> Product {
        Product { id, name: name.into(), description: String::new(), image: None, keywords: vec![] }
    }

    #[test]
    fn flattens_in_category_order() {
        let catalog = Catalog {
            categories: vec![
                Category { name: "a".into(), products: vec![product(3, "x"), product(1, "y")] },
                Category { name: "b".into(), products: vec![product(2, "z")] },
            ],
        };
        let ids: Vec<ProductId> = catalog.products().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        let index = ProductIndex::build(&catalog);
        assert_eq!(index.order(), &[3, 1, 2]);
        assert_eq!(index.slot(2), Some((1, 0)));
        assert_eq!(index.position(1), Some(1));
        assert!(!index.contains(9));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let catalog = Catalog {
            categories: vec![
                Category { name: "a".into(), products: vec![product(1, "x")] },
                Category { name: "b".into(), products: vec![product(1, "y")] },
            ],
        };
        assert!(matches!(catalog.validate(), Err(DataError::DuplicateProduct(1))));
    }
}
