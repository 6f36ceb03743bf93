/*!
 * Authenticated claims extractor
 *
 * Responsibility:
 * - permission gate を通過したリクエストの AuthClaims を handler に提供する
 * - HTTP / axum 依存は core に閉じ込める
 *
 * Public API:
 * - Authenticated
 */

mod core;

pub use core::Authenticated;
