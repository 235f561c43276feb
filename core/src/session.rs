use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::ProductId;

/// Oldest queries are dropped past this many per user.
pub const MAX_RECORDED_SEARCHES: usize = 50;

/// Username -> purchased product ids, in purchase order.
pub type UserCarts = HashMap<String, Vec<ProductId>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionHistory {
    #[serde(default)]
    pub views: Vec<ProductId>,
    #[serde(default)]
    pub searches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Login lookup: trimmed, case-insensitive match on username.
pub fn find_user<'a>(users: &'a [User], input: &str) -> Option<&'a User> {
    let wanted = input.trim().to_lowercase();
    users.iter().find(|u| u.username.to_lowercase() == wanted)
}

/// In-memory carts and interaction histories shared by request handlers.
#[derive(Default)]
pub struct SessionStore {
    carts: RwLock<UserCarts>,
    interactions: RwLock<HashMap<String, InteractionHistory>>,
}

impl SessionStore {
    pub fn new(carts: UserCarts, interactions: HashMap<String, InteractionHistory>) -> Self {
        Self { carts: RwLock::new(carts), interactions: RwLock::new(interactions) }
    }

    pub fn cart(&self, username: &str) -> Vec<ProductId> {
        self.carts.read().get(username).cloned().unwrap_or_default()
    }

    /// Adds a product to the user's cart. Returns false when it was already there.
    pub fn add_to_cart(&self, username: &str, product_id: ProductId) -> bool {
        let mut carts = self.carts.write();
        let cart = carts.entry(username.to_string()).or_default();
        if cart.contains(&product_id) {
            return false;
        }
        cart.push(product_id);
        true
    }

    /// Copy of every user's cart, for popularity counting.
    pub fn all_carts(&self) -> UserCarts { self.carts.read().clone() }

    /// Records a product view. Repeat views of the same product are not stored again.
    pub fn record_view(&self, username: &str, product_id: ProductId) {
        let mut interactions = self.interactions.write();
        let views = &mut interactions.entry(username.to_string()).or_default().views;
        if !views.contains(&product_id) {
            views.push(product_id);
        }
    }

    pub fn record_search(&self, username: &str, query: &str) {
        let mut interactions = self.interactions.write();
        let searches = &mut interactions.entry(username.to_string()).or_default().searches;
        searches.push(query.to_string());
        if searches.len() > MAX_RECORDED_SEARCHES {
            let overflow = searches.len() - MAX_RECORDED_SEARCHES;
            searches.drain(..overflow);
        }
    }

    pub fn history(&self, username: &str) -> InteractionHistory {
        self.interactions.read().get(username).cloned().unwrap_or_default()
    }

    /// Content-based reference set: cart entries first, then viewed products, without repeats.
    pub fn reference_set(&self, username: &str) -> Vec<ProductId> {
        reference_set(&self.cart(username), &self.history(username))
    }
}

pub fn reference_set(cart: &[ProductId], history: &InteractionHistory) -> Vec<ProductId> {
    let mut out: Vec<ProductId> = Vec::with_capacity(cart.len() + history.views.len());
    for &id in cart.iter().chain(history.views.iter()) {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
