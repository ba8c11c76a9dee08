use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("bucket list must not be empty")]
    EmptyBuckets,
    #[error("invalid bucket at index {index}: {reason}")]
    InvalidBucket { index: usize, reason: &'static str },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing bucket list")]
    MissingBuckets,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
