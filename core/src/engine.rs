use crate::catalog::{Product, ProductId};
use crate::combine::combine;
use crate::config::RecommenderConfig;
use crate::session::UserCarts;
use crate::snapshot::{CatalogSnapshot, CatalogState};
use crate::{content, popularity};

/// Per-request inputs. Nothing here outlives the request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub username: &'a str,
    /// Products the user bought or viewed; drives content-based scoring.
    pub reference: &'a [ProductId],
    /// Every user's cart; drives popularity scoring.
    pub carts: &'a UserCarts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Popularity,
    ContentBased,
    Collaborative,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutput<'a> {
    Products(Vec<&'a Product>),
    NotImplemented,
}

impl Strategy {
    pub fn run<'a>(&self, snapshot: &'a CatalogSnapshot, ctx: &RequestContext<'_>, config: &RecommenderConfig) -> StrategyOutput<'a> {
        match self {
            Strategy::Popularity => StrategyOutput::Products(popularity::recommend(snapshot, ctx.carts, config)),
            Strategy::ContentBased => StrategyOutput::Products(content::recommend(snapshot, ctx.reference, config.top_k)),
            Strategy::Collaborative => StrategyOutput::NotImplemented,
        }
    }
}

/// Runs strategies in order and merges their output, earlier strategies taking precedence.
#[derive(Debug, Clone)]
pub struct Engine {
    config: RecommenderConfig,
    strategies: Vec<Strategy>,
}

impl Engine {
    pub fn new(config: RecommenderConfig) -> Self {
        Self::with_strategies(config, vec![Strategy::Popularity, Strategy::ContentBased, Strategy::Collaborative])
    }

    pub fn with_strategies(config: RecommenderConfig, strategies: Vec<Strategy>) -> Self {
        Self { config, strategies }
    }

    pub fn config(&self) -> &RecommenderConfig { &self.config }

    pub fn strategies(&self) -> &[Strategy] { &self.strategies }

    pub fn recommend<'a>(&self, snapshot: &'a CatalogSnapshot, ctx: &RequestContext<'_>) -> Vec<&'a Product> {
        let mut lists = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            match strategy.run(snapshot, ctx, &self.config) {
                StrategyOutput::Products(products) => {
                    tracing::debug!(user = ctx.username, ?strategy, count = products.len(), "strategy produced");
                    lists.push(products);
                }
                StrategyOutput::NotImplemented => {
                    tracing::debug!(user = ctx.username, ?strategy, "strategy not implemented; skipped");
                }
            }
        }
        let combined = combine(lists);
        if combined.is_empty() {
            tracing::info!(user = ctx.username, "no recommendations available");
        }
        combined
    }

    /// Like `recommend`, but an unloaded or failed catalog yields an empty list instead of an error.
    pub fn recommend_from_state<'a>(&self, state: &'a CatalogState, ctx: &RequestContext<'_>) -> Vec<&'a Product> {
        match state {
            CatalogState::Loaded(snapshot) => self.recommend(snapshot, ctx),
            CatalogState::NotLoaded => {
                tracing::warn!(user = ctx.username, "catalog not loaded; no recommendations");
                vec![]
            }
            CatalogState::Failed(e) => {
                tracing::warn!(user = ctx.username, error = %e, "catalog unavailable; no recommendations");
                vec![]
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new(RecommenderConfig::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use std::collections::HashMap;

    #[test]
    fn collaborative_is_reported_not_implemented() {
        let snapshot = CatalogSnapshot::build(Catalog::new());
        let carts = HashMap::new();
        let ctx = RequestContext { username: "an", reference: &[], carts: &carts };
        assert_eq!(Strategy::Collaborative.run(&snapshot, &ctx, &RecommenderConfig::default()), StrategyOutput::NotImplemented);
    }

    #[test]
    fn unloaded_catalog_gives_empty_list() {
        let carts = HashMap::new();
        let ctx = RequestContext { username: "an", reference: &[1], carts: &carts };
        assert!(Engine::default().recommend_from_state(&CatalogState::NotLoaded, &ctx).is_empty());
    }

    #[test]
    fn popularity_comes_before_content() {
        let product = |id: ProductId, name: &str| Product { id, name: name.into(), description: String::new(), image: None, keywords: vec![] };
        let snapshot = CatalogSnapshot::build(Catalog {
            categories: vec![Category {
                name: "tea".into(),
                products: vec![product(1, "green tea"), product(2, "green tea bags"), product(3, "black coffee"), product(4, "oolong leaves")],
            }],
        });
        let carts: UserCarts = [("an".to_string(), vec![1, 3]), ("binh".to_string(), vec![3])].into_iter().collect();
        let reference = [1];
        let ctx = RequestContext { username: "an", reference: &reference, carts: &carts };
        let ids: Vec<ProductId> = Engine::default().recommend(&snapshot, &ctx).iter().map(|p| p.id).collect();
        assert_eq!(ids[0], 3);
        assert_eq!(ids[1], 2);
        assert_eq!(ids.len(), 3);
    }
}
