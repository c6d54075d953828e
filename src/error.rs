// src/error.rs
//
// Library error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTML parser could not build a tree from the input.
    #[error("unparseable input: {0}")]
    Unparseable(#[from] std::io::Error),

    #[error("invalid policy config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("malformed init data: {0}")]
    Signature(String),

    #[error("message delivery failed: {primary}; degraded retry failed: {fallback}")]
    Dispatch { primary: String, fallback: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
