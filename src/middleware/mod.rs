/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access::require(...) (permission gate), cors::apply(...), http::apply(...)
 */
pub mod auth;
pub mod cors;
pub mod http;
