//! Shared helpers for the SeaORM stores.

use sea_orm::{DbErr, SqlErr};

use crate::errors::{AppError, AppResult};

/// Convert a batch of database models into domain entities, failing on the first corrupt row.
pub(crate) fn into_domain<M, T>(models: Vec<M>) -> AppResult<Vec<T>>
where
    T: TryFrom<M, Error = AppError>,
{
    models.into_iter().map(T::try_from).collect()
}

/// Map a unique-index violation to `Conflict`, any other error to `Database`.
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(message),
        _ => AppError::from(err),
    }
}
