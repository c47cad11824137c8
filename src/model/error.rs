use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl DatabaseError {
    fn pg_code(&self) -> Option<String> {
        match self {
            Self::SqlxError(sqlx::Error::Database(e)) => e.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    /// Postgres `unique_violation`, e.g. a second progress row for the same
    /// (alumno, leccion) pair or a duplicated email.
    pub fn is_unique_violation(&self) -> bool {
        self.pg_code().as_deref() == Some("23505")
    }

    /// Postgres `foreign_key_violation`, i.e. a referenced entity is absent.
    pub fn is_fk_violation(&self) -> bool {
        self.pg_code().as_deref() == Some("23503")
    }
}
