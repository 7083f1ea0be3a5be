use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
}
