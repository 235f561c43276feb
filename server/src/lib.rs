use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use recsys_core::persist::{load_carts, load_catalog_state, load_interactions, load_users, DataPaths};
use recsys_core::session::find_user;
use recsys_core::{CatalogSnapshot, CatalogState, Engine, Product, ProductId, RecommenderConfig, RequestContext, SessionStore, User};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

pub const EMPTY_STATE_MESSAGE: &str = "no recommendations available";

#[derive(Deserialize)]
pub struct RecommendParams {
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub user: String,
    pub took_s: f64,
    pub total: usize,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub category: Option<String>,
    pub user: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_hits: usize,
    pub results: Vec<Product>,
}

#[derive(Deserialize)]
pub struct SimilarityParams {
    pub a: ProductId,
    pub b: ProductId,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub user: String,
    pub added: Option<bool>,
    pub products: Vec<Product>,
}

#[derive(Clone)]
pub struct AppState {
    pub data_root: PathBuf,
    pub catalog: Arc<RwLock<CatalogState>>,
    pub users: Arc<Vec<User>>,
    pub sessions: Arc<SessionStore>,
    pub engine: Arc<Engine>,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Loads catalog, users, carts and interaction histories from `data_dir`.
    /// Load failures are logged and leave the affected data empty; they never abort startup.
    pub fn load(data_dir: &str, config: RecommenderConfig) -> Self {
        let paths = DataPaths::new(data_dir);
        let catalog = load_catalog_state(&paths);
        let users = load_users(&paths).unwrap_or_else(|e| {
            tracing::error!(error = %e, "users unavailable");
            Vec::new()
        });
        let carts = load_carts(&paths).unwrap_or_else(|e| {
            tracing::error!(error = %e, "carts unavailable");
            Default::default()
        });
        let interactions = load_interactions(&paths).unwrap_or_else(|e| {
            tracing::error!(error = %e, "interaction histories unavailable");
            Default::default()
        });
        tracing::info!(users = users.len(), catalog_loaded = catalog.is_loaded(), "data loaded");
        Self {
            data_root: PathBuf::from(data_dir),
            catalog: Arc::new(RwLock::new(catalog)),
            users: Arc::new(users),
            sessions: Arc::new(SessionStore::new(carts, interactions)),
            engine: Arc::new(Engine::new(config)),
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
        }
    }

    fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, ApiError> {
        self.catalog
            .read()
            .snapshot()
            .cloned()
            .ok_or((StatusCode::SERVICE_UNAVAILABLE, "catalog unavailable".into()))
    }

    fn user(&self, username: &str) -> Result<&User, ApiError> {
        find_user(&self.users, username).ok_or((StatusCode::NOT_FOUND, format!("unknown user {username}")))
    }
}

pub fn build_app(data_dir: String, config: RecommenderConfig) -> Router {
    router(AppState::load(&data_dir, config))
}

pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/users/:username", get(user_handler))
        .route("/users/:username/cart", get(cart_handler))
        .route("/users/:username/cart/:product_id", post(add_to_cart_handler))
        .route("/users/:username/views/:product_id", post(view_handler))
        .route("/recommendations/:username", get(recommendations_handler))
        .route("/products/:product_id", get(product_handler))
        .route("/categories/:name", get(category_handler))
        .route("/search", get(search_handler))
        .route("/similarity", get(similarity_handler))
        .route("/catalog/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn user_handler(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<User>, ApiError> {
    state.user(&username).cloned().map(Json)
}

pub async fn recommendations_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let start = std::time::Instant::now();
    let user = state.user(&username)?.username.clone();

    let engine = match params.k {
        Some(k) => {
            let config = RecommenderConfig { top_k: k.clamp(1, 100), ..state.engine.config().clone() };
            Engine::with_strategies(config, state.engine.strategies().to_vec())
        }
        None => state.engine.as_ref().clone(),
    };
    let catalog = state.catalog.read().clone();
    let reference = state.sessions.reference_set(&user);
    let carts = state.sessions.all_carts();
    let ctx = RequestContext { username: &user, reference: &reference, carts: &carts };
    let products: Vec<Product> = engine.recommend_from_state(&catalog, &ctx).into_iter().cloned().collect();

    let message = products.is_empty().then(|| EMPTY_STATE_MESSAGE.to_string());
    tracing::debug!(user = %user, total = products.len(), "recommendations served");
    Ok(Json(RecommendationsResponse { user, took_s: start.elapsed().as_secs_f64(), total: products.len(), products, message }))
}

pub async fn product_handler(State(state): State<AppState>, Path(product_id): Path<ProductId>) -> Result<Json<Product>, ApiError> {
    let snapshot = state.snapshot()?;
    snapshot
        .product(product_id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("unknown product {product_id}")))
}

pub async fn category_handler(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Vec<Product>>, ApiError> {
    let snapshot = state.snapshot()?;
    snapshot
        .category_products(&name)
        .map(|products| Json(products.to_vec()))
        .ok_or((StatusCode::NOT_FOUND, format!("unknown category {name}")))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let snapshot = state.snapshot()?;
    if let Some(user) = params.user.as_deref() {
        let username = state.user(user)?.username.clone();
        if !params.q.trim().is_empty() {
            state.sessions.record_search(&username, params.q.trim());
        }
    }
    let results: Vec<Product> = snapshot.search(&params.q, params.category.as_deref()).into_iter().cloned().collect();
    Ok(Json(SearchResponse { query: params.q, total_hits: results.len(), results }))
}

pub async fn similarity_handler(State(state): State<AppState>, Query(params): Query<SimilarityParams>) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.snapshot()?;
    let similarity = snapshot
        .similarity(params.a, params.b)
        .ok_or((StatusCode::NOT_FOUND, "unknown product".to_string()))?;
    Ok(Json(serde_json::json!({ "a": params.a, "b": params.b, "similarity": similarity })))
}

pub async fn cart_handler(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<CartResponse>, ApiError> {
    let user = state.user(&username)?.username.clone();
    let products = cart_products(&state, &user)?;
    Ok(Json(CartResponse { user, added: None, products }))
}

pub async fn add_to_cart_handler(State(state): State<AppState>, Path((username, product_id)): Path<(String, ProductId)>) -> Result<Json<CartResponse>, ApiError> {
    let user = state.user(&username)?.username.clone();
    let snapshot = state.snapshot()?;
    if snapshot.product(product_id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("unknown product {product_id}")));
    }
    let added = state.sessions.add_to_cart(&user, product_id);
    tracing::info!(user = %user, product_id, added, "cart updated");
    let products = cart_products(&state, &user)?;
    Ok(Json(CartResponse { user, added: Some(added), products }))
}

pub async fn view_handler(State(state): State<AppState>, Path((username, product_id)): Path<(String, ProductId)>) -> Result<Json<Product>, ApiError> {
    let user = state.user(&username)?.username.clone();
    let snapshot = state.snapshot()?;
    let product = snapshot
        .product(product_id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, format!("unknown product {product_id}")))?;
    state.sessions.record_view(&user, product_id);
    Ok(Json(product))
}

fn cart_products(state: &AppState, user: &str) -> Result<Vec<Product>, ApiError> {
    let snapshot = state.snapshot()?;
    Ok(state
        .sessions
        .cart(user)
        .into_iter()
        .filter_map(|id| snapshot.product(id).cloned())
        .collect())
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let fresh = load_catalog_state(&DataPaths::new(&state.data_root));
    let mut current = state.catalog.write();
    match fresh {
        CatalogState::Loaded(snapshot) => {
            let num_products = snapshot.len();
            *current = CatalogState::Loaded(snapshot);
            tracing::info!(num_products, "catalog reloaded");
            Ok(Json(serde_json::json!({ "reloaded": true, "num_products": num_products })))
        }
        CatalogState::Failed(e) => {
            // keep serving the previous snapshot, if any
            if !current.is_loaded() {
                *current = CatalogState::Failed(e.clone());
            }
            Err((StatusCode::UNPROCESSABLE_ENTITY, format!("reload failed: {e}")))
        }
        CatalogState::NotLoaded => Err((StatusCode::INTERNAL_SERVER_ERROR, "catalog not loaded".into())),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
