pub mod catalog;
pub mod combine;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod persist;
pub mod popularity;
pub mod session;
pub mod similarity;
pub mod snapshot;
pub mod tfidf;
pub mod tokenizer;
pub mod vocabulary;

pub use catalog::{Catalog, Category, Product, ProductId};
pub use config::RecommenderConfig;
pub use engine::{Engine, RequestContext, Strategy, StrategyOutput};
pub use error::DataError;
pub use session::{InteractionHistory, SessionStore, User, UserCarts};
pub use similarity::cosine_similarity;
pub use snapshot::{CatalogSnapshot, CatalogState};
pub use tfidf::TermWeights;
pub use vocabulary::{TermId, Vocabulary};
