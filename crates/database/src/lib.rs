//! # Epiquery Database Crate
//!
//! This crate is the store collaborator of the query pipeline: it owns the
//! PostgreSQL connection pool and runs the statements the pipeline builds.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Everything PostgreSQL-specific lives here. The rest of the
//!   application sees an `Executor` that takes a `SqlFragment` and returns
//!   typed rows.
//! - **Read Only:** Statements are `SELECT`s built elsewhere; nothing here
//!   writes to or migrates the store.
//! - **One Connection Per Call:** Each execution acquires a pooled connection
//!   for its single round trip and returns it on every exit path.
//!
//! ## Public API
//!
//! - `connect`: builds the connection pool from `DatabaseSettings`.
//! - `Executor`: the seam the web layer depends on.
//! - `PgExecutor`: the PostgreSQL implementation.
//! - `QueryOutcome`: rows, or the explicit "no rows" signal.
//! - `DbError`: the specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod executor;
pub mod rows;

pub use connection::{connect, connect_options};
pub use error::DbError;
pub use executor::{Executor, PgExecutor, QueryOutcome};
