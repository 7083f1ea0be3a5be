//! # Epiquery Pipeline
//!
//! This crate turns the raw parameters of a request into a parameterized SQL
//! statement, and turns the rows that statement returns into the response shape.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O. It depends only on `core-types`; running the SQL is
//!   the job of the `database` crate.
//! - **Fail Before Building:** Every user-facing check happens in the validator.
//!   The builder only ever sees values that already passed their allow-lists and
//!   treats anything else as an internal fault.
//! - **No Raw Interpolation:** User text is always bound through a positional
//!   placeholder. The only identifiers spliced into query text come from static
//!   tables in `templates`.
//!
//! ## Public API
//!
//! - `schema_for` / `schema_for_route`: the parameter schema of a logical query.
//! - `validate`: checks a `RequestParameters` against a schema.
//! - `build`: renders a `ValidatedQuery` through a `QueryTemplate`.
//! - `shape_flat` / `shape_grouped`: reshape rows for the response.
//! - `prepare`: registry, validator, template and builder in one call.

pub mod builder;
pub mod error;
pub mod schema;
pub mod shaper;
pub mod templates;
pub mod validator;

pub use builder::{build, full_indicator};
pub use error::{BuildError, PipelineError, ValidationError};
pub use schema::{ParamKind, ParamRole, ParamSpec, QuerySchema, schema_for, schema_for_route};
pub use shaper::{ENTITY_COLUMN_INDEX, shape_flat, shape_for, shape_grouped};
pub use templates::{QueryTemplate, countries_fragment, template_for};
pub use validator::{check_unknown, validate};

use core_types::{LogicalQuery, RequestParameters, SqlFragment};

/// Validates `params` for `query` and builds the statement to run.
///
/// The entity listing has no template: it only rejects unknown parameters and
/// then runs its fixed statement.
pub fn prepare(
    query: LogicalQuery,
    params: &RequestParameters,
) -> Result<SqlFragment, PipelineError> {
    let schema = schema_for(query);
    let Some(template) = template_for(query) else {
        check_unknown(params, schema)?;
        return Ok(countries_fragment());
    };
    let validated = validate(params, schema)?;
    let fragment = build(&validated, template)?;
    tracing::debug!(
        query = %query,
        sql = %fragment.text,
        binds = fragment.args.len(),
        "Built query."
    );
    Ok(fragment)
}
