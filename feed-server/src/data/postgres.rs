use sqlx::PgPool;
use tracing::error;

use crate::domain::error::DomainError;

#[derive(Clone)]
pub struct PostgresStore {
    pub(crate) pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        error!("{}: {}", context, e);
        DomainError::from(e)
    }
}

/// Name of the violated constraint, if the error is a constraint violation.
pub(crate) fn violated_constraint(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned)
}
