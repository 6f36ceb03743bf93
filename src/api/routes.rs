/*
 * Responsibility
 * - URL 構造を定義
 * - 各 route が必要とする permission をここで宣言する (gate は middleware::auth::access)
 * - 一致しない path / method も JSON の error envelope で返す
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::error::AppError;
use crate::middleware::auth::access::require;
use crate::services::auth::permissions;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/drinks",
            get(list_drinks).merge(require(
                post(create_drink),
                state,
                permissions::POST_DRINKS,
            )),
        )
        .route(
            "/drinks-detail",
            require(
                get(list_drinks_detail),
                state,
                permissions::GET_DRINKS_DETAIL,
            ),
        )
        .route(
            "/drinks/{drink_id}",
            require(patch(update_drink), state, permissions::PATCH_DRINKS).merge(require(
                delete(delete_drink),
                state,
                permissions::DELETE_DRINKS,
            )),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
