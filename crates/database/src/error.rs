use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Column '{column}' has unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },
}
