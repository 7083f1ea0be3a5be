use core_types::{EntitySeries, LogicalQuery, ResultRow, ShapedResult, Value};
use std::collections::HashMap;

/// Position of the entity column in rows of grouped templates: the date comes
/// first, the entity second.
pub const ENTITY_COLUMN_INDEX: usize = 1;

/// Single-entity results pass through as they came from the store.
pub fn shape_flat(rows: Vec<ResultRow>) -> ShapedResult {
    ShapedResult::Flat(rows.into_iter().map(ResultRow::into_values).collect())
}

/// Groups rows by the value at `entity_index`, dropping that column.
///
/// Precondition: rows arrive grouped by entity and in date order within each
/// entity, which the `ORDER BY` of grouped templates guarantees. No sorting
/// happens here; groups appear in first-seen order and each keeps row order.
pub fn shape_grouped(rows: Vec<ResultRow>, entity_index: usize) -> ShapedResult {
    let mut series: Vec<EntitySeries> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let mut values = row.into_values();
        let entity = if entity_index < values.len() {
            values.remove(entity_index)
        } else {
            Value::Null
        };
        let key = match entity {
            Value::Text(name) => name,
            other => other.to_string(),
        };

        let position = *positions.entry(key.clone()).or_insert_with(|| {
            series.push(EntitySeries {
                entity: key,
                rows: Vec::new(),
            });
            series.len() - 1
        });
        series[position].rows.push(values);
    }

    ShapedResult::Grouped(series)
}

/// Picks the shape that `query` responds with.
pub fn shape_for(query: LogicalQuery, rows: Vec<ResultRow>) -> ShapedResult {
    if query.is_comparison() {
        shape_grouped(rows, ENTITY_COLUMN_INDEX)
    } else {
        shape_flat(rows)
    }
}
