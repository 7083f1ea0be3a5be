use thiserror::Error;

/// A request that does not fit its query's parameter schema. Every variant is
/// user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown parameters: {}", .0.join(", "))]
    UnknownParameter(Vec<String>),

    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    #[error("Invalid {param} name: {value}")]
    InvalidEnumValue { param: String, value: String },

    #[error("Dates must be of the form YYYY-MM-DD, got {param}={value}")]
    MalformedDate { param: String, value: String },

    #[error("{param} must be a boolean value")]
    InvalidBoolean { param: String },

    #[error("At least {min} countries must be provided for parameter: {param}")]
    InsufficientEntities { param: String, min: usize },
}

/// A validated query that still cannot be rendered. Reaching any of these
/// means the schema and the template disagree; none of them is caused by the
/// caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("'{0}' is not in the allow-list of the query template")]
    UnlistedIdentifier(String),

    #[error("The query template selects a column but no metric was validated")]
    MissingMetric,

    #[error("A single-entity template received {0} entities")]
    EntityArity(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
