pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::LogicalQuery;
pub use error::CoreError;
pub use structs::{
    DateRange, EntitySeries, ParamValue, RequestParameters, ResultRow, ShapedResult, SqlFragment,
    ValidatedQuery, Value,
};
