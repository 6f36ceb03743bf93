/*
 * Responsibility
 * - /drinks, /drinks-detail, /drinks/{drink_id} の handler
 * - 認可は route 側の gate が済ませている (handler は Authenticated を受け取るだけ)
 * - store の失敗は操作ごとに決めたステータスへ明示的に訳す
 *   - create / delete: 422
 *   - update: 400 (lookup の not found のみ 404)
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeletedResponse, DrinksResponse, UpdateDrinkRequest,
            UpdatedResponse,
        },
        extractors::Authenticated,
    },
    error::AppError,
    models::{Drink, Recipe, drink::DrinkDetail, drink::DrinkSummary},
    state::AppState,
};

async fn fetch_all(state: &AppState) -> Result<Vec<Drink>, AppError> {
    let drinks = state.store.list().await.map_err(|e| {
        tracing::error!(error = ?e, "drink_repo::list failed");
        AppError::Internal
    })?;

    if drinks.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(drinks)
}

// 数値でない id は該当リソースなしとして扱う
fn drink_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkSummary>>, AppError> {
    let drinks = fetch_all(&state).await?;

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::summary).collect(),
    )))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    Authenticated(_claims): Authenticated,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let drinks = fetch_all(&state).await?;

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::detail).collect(),
    )))
}

pub async fn create_drink(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "create payload rejected");
        AppError::Unprocessable
    })?;
    req.validate().map_err(|_| AppError::Unprocessable)?;

    let recipe = Recipe::from(req.recipe);
    let drink = state
        .store
        .create(&req.title, &recipe)
        .await
        .map_err(|e| {
            tracing::warn!(error = ?e, "drink_repo::create failed");
            AppError::Unprocessable
        })?;

    tracing::info!(id = drink.id, subject = %claims.subject, "drink created");

    Ok(Json(DrinksResponse::new(vec![drink.detail()])))
}

pub async fn update_drink(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<UpdatedResponse>, AppError> {
    let id = drink_id(path)?;

    state
        .store
        .get(id)
        .await
        .map_err(|e| {
            tracing::warn!(error = ?e, "drink_repo::get failed");
            AppError::bad_request("lookup failed")
        })?
        .ok_or(AppError::NotFound)?;

    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    req.validate().map_err(AppError::bad_request)?;

    // validate 済みなので explicit null はここに来ない
    let title = req.title.flatten();
    let recipe = req.recipe.flatten().map(Recipe::from);

    // 同時削除などで lookup 後に消えた場合も 400 (NotFound に言い換えない)
    state
        .store
        .update(id, title.as_deref(), recipe.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!(error = ?e, "drink_repo::update failed");
            AppError::bad_request("update failed")
        })?;

    tracing::info!(id, subject = %claims.subject, "drink updated");

    Ok(Json(UpdatedResponse { success: true }))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = drink_id(path)?;

    state
        .store
        .get(id)
        .await
        .map_err(|e| {
            tracing::warn!(error = ?e, "drink_repo::get failed");
            AppError::Unprocessable
        })?
        .ok_or(AppError::NotFound)?;

    let deleted = state.store.delete(id).await.map_err(|e| {
        tracing::warn!(error = ?e, "drink_repo::delete failed");
        AppError::Unprocessable
    })?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(id, subject = %claims.subject, "drink deleted");

    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
    }))
}
