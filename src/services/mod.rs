pub mod actor_service;
pub mod dates;
pub mod movie_service;
pub mod reconcile;

pub use actor_service::ActorService;
pub use movie_service::{MovieFilter, MovieService};

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

/// Reject blank text and text longer than `max_chars`.
pub(crate) fn require_text(field: &'static str, value: &str, max_chars: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, format!("{} must not be empty", field)));
    }
    check_length(field, value, max_chars)
}

pub(crate) fn check_length(field: &'static str, value: &str, max_chars: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max_chars {
        return Err(ServiceError::validation(
            field,
            format!("{} must be at most {} characters", field, max_chars),
        ));
    }
    Ok(())
}

/// Sorted, deduplicated copy of an ID list
pub(crate) fn unique_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
