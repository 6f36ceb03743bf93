/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: DrinkStore 実装 (本番は PgDrinkStore、テストは MemoryDrinkStore)
 *   - verifier: TokenVerifier (key set cache を内包)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::DrinkStore;
use crate::services::auth::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, verifier: Arc<TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("verifier", &self.verifier)
            .finish()
    }
}
