//! Permission gate: Bearer token 検証 → 権限チェック → AuthClaims を extensions に入れる
//!
//! 各 route は必要な permission をデータとして宣言し、handler 本体の前で
//! この middleware だけが走る:
//! 1. `Authorization: Bearer <token>` の取り出し
//! 2. TokenVerifier で署名 / iss / aud / exp / alg を検証
//! 3. guard::authorize で permission の有無を判定
//! 4. 成功時のみ AuthClaims を request extensions に格納して handler へ

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::auth::{authorize, bearer_token};
use crate::state::AppState;

#[derive(Clone)]
struct Gate {
    state: AppState,
    permission: &'static str,
}

/// `permission` を要求する gate を MethodRouter に掛ける。
///
/// 例：
/// ```ignore
/// .route("/drinks-detail", access::require(get(list_drinks_detail), &state, permissions::GET_DRINKS_DETAIL))
/// ```
pub fn require(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    let gate = Gate {
        state: state.clone(),
        permission,
    };
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    route.route_layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<Gate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;

    let claims = match gate.state.verifier.verify(token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                kind = err.kind.code(),
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    if let Err(err) = authorize(&claims, gate.permission) {
        tracing::warn!(
            subject = %claims.subject,
            permission = gate.permission,
            kind = err.kind.code(),
            "permission check failed"
        );
        return Err(err.into());
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
