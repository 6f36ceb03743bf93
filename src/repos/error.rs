/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - handler 側は RepoError の種類を見て 404 / 400 / 422 に訳す
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("stored recipe is not a valid ingredient list")]
    Serialization(#[from] serde_json::Error),
    #[error("db error")]
    Db(#[source] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

// 23505 unique_violation / 23502 not_null_violation / 22001 string_data_right_truncation
const CONSTRAINT_CODES: &[&str] = &["23505", "23502", "22001"];

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && let Some(code) = dbe.code()
            && CONSTRAINT_CODES.iter().any(|c| code == *c)
        {
            return RepoError::Constraint(dbe.message().to_string());
        }
        if matches!(e, sqlx::Error::RowNotFound) {
            return RepoError::NotFound;
        }
        RepoError::Db(e)
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        Self::from_sqlx(e)
    }
}
