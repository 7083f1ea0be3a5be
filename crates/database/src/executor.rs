use crate::error::DbError;
use crate::rows::decode_row;
use async_trait::async_trait;
use core_types::{ResultRow, SqlFragment};
use sqlx::PgPool;

/// What a successful execution produced. Zero rows is a normal outcome of a
/// well-formed query and is kept apart from `DbError`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<ResultRow>),
    NoRows,
}

impl QueryOutcome {
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        if rows.is_empty() {
            QueryOutcome::NoRows
        } else {
            QueryOutcome::Rows(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::NoRows)
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::NoRows => Vec::new(),
        }
    }
}

/// Runs a built statement against the store. Single attempt, no retry.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, fragment: &SqlFragment) -> Result<QueryOutcome, DbError>;
}

/// Executes statements on a pooled PostgreSQL connection.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Creates a new `PgExecutor` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Executor for PgExecutor {
    async fn execute(&self, fragment: &SqlFragment) -> Result<QueryOutcome, DbError> {
        // Dropping the connection hands it back to the pool, so every return
        // below (including `?`) releases it.
        let mut conn = self.pool.acquire().await?;

        let mut query = sqlx::query(&fragment.text);
        for arg in &fragment.args {
            query = query.bind(arg.as_str());
        }
        let rows = query.fetch_all(&mut *conn).await?;

        let decoded = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = decoded.len(), "Query executed.");
        Ok(QueryOutcome::from_rows(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Value;

    #[test]
    fn zero_rows_is_the_empty_signal() {
        let outcome = QueryOutcome::from_rows(Vec::new());
        assert_eq!(outcome, QueryOutcome::NoRows);
        assert!(outcome.is_empty());
        assert!(outcome.into_rows().is_empty());
    }

    #[test]
    fn rows_come_back_in_order() {
        let rows = vec![
            ResultRow::new(vec![Value::from("2021-01-01"), Value::Int(1)]),
            ResultRow::new(vec![Value::from("2021-01-02"), Value::Int(2)]),
        ];
        let outcome = QueryOutcome::from_rows(rows.clone());
        assert!(!outcome.is_empty());
        assert_eq!(outcome.into_rows(), rows);
    }
}
