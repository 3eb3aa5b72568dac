//! Transaction helpers for repositories.
//!
//! A transaction dropped without [`commit_transaction`] is rolled back, so
//! early returns through `?` never leave partial writes behind.

use crate::error::AppError;
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

pub async fn begin_transaction(db: &PgPool) -> Result<PgTransaction<'static>, AppError> {
    db.begin().await.map_err(AppError::Storage)
}

pub async fn commit_transaction(tx: PgTransaction<'_>) -> Result<(), AppError> {
    tx.commit().await.map_err(AppError::Storage)
}

/// Explicit rollback for paths that return `Ok` without writing.
pub async fn rollback_transaction(tx: PgTransaction<'_>) -> Result<(), AppError> {
    tx.rollback().await.map_err(AppError::Storage)
}
