use serde::{Deserialize, Serialize};

fn default_top_k() -> usize { 10 }
fn default_popularity_threshold() -> u32 { 2 }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommenderConfig {
    /// Maximum number of content-based recommendations.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum purchase count for a product to be considered popular.
    #[serde(default = "default_popularity_threshold")]
    pub popularity_threshold: u32,
    /// Count each buyer once instead of counting every cart entry.
    #[serde(default)]
    pub distinct_buyers: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { top_k: default_top_k(), popularity_threshold: default_popularity_threshold(), distinct_buyers: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: RecommenderConfig = serde_json::from_str(r#"{"top_k": 5}"#).unwrap();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.popularity_threshold, 2);
        assert!(!cfg.distinct_buyers);
    }
}
