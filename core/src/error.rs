use thiserror::Error;

use crate::catalog::ProductId;

/// Failures at the data boundary. The scoring pipeline itself never fails.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
}
