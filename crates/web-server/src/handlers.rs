use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, MethodRouter},
    Json,
};
use core_types::{LogicalQuery, RequestParameters, ShapedResult, Value};
use std::sync::Arc;

/// Raw query-string pairs in arrival order. Repeated keys stay repeated, which
/// is how list parameters such as `countries` arrive.
pub type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn request_parameters(pairs: QueryPairs) -> Result<RequestParameters, AppError> {
    let Query(pairs) = pairs.map_err(|rejection| AppError::MalformedQuery(rejection.body_text()))?;
    Ok(RequestParameters::from_pairs(pairs))
}

fn no_rows(query: LogicalQuery) -> String {
    format!("Query returned no rows for {}", query.route())
}

/// # GET /api/get-countries
/// Lists the name of every known entity.
pub async fn get_countries(
    State(state): State<Arc<AppState>>,
    pairs: QueryPairs,
) -> Result<Json<Vec<Value>>, AppError> {
    let params = request_parameters(pairs)?;
    let fragment = pipeline::prepare(LogicalQuery::Countries, &params)?;
    let outcome = state.executor.execute(&fragment).await?;

    let names: Vec<Value> = outcome
        .into_rows()
        .into_iter()
        .filter_map(|row| row.into_values().into_iter().next())
        .collect();
    if names.is_empty() {
        return Err(AppError::EmptyResult(no_rows(LogicalQuery::Countries)));
    }
    Ok(Json(names))
}

/// The GET route for one data query, e.g. `/api/compare-cases-by-country`.
pub fn data_route(query: LogicalQuery) -> MethodRouter<Arc<AppState>> {
    get(move |state: State<Arc<AppState>>, pairs: QueryPairs| query_handler(state, query, pairs))
}

/// # GET /api/<metric>-by-country, /api/compare-<metric>-by-country
/// Validates, builds, executes and shapes. Validation failures return before
/// anything reaches the store.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    query: LogicalQuery,
    pairs: QueryPairs,
) -> Result<Json<ShapedResult>, AppError> {
    let params = request_parameters(pairs)?;
    let fragment = pipeline::prepare(query, &params)?;
    let outcome = state.executor.execute(&fragment).await?;

    let shaped = pipeline::shape_for(query, outcome.into_rows());
    if shaped.is_empty() {
        return Err(AppError::EmptyResult(no_rows(query)));
    }
    Ok(Json(shaped))
}
