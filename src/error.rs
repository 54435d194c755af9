//! Configuration error taxonomy.
//!
//! Every way loading or validating configuration can fail, surfaced once at
//! startup so nothing fails mid-request: a load/deserialize failure, a
//! max-age expression that does not parse or resolves negative, a route with
//! an empty target, or an unparseable listen address.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying configuration source failed to load or deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A max-age expression could not be parsed.
    #[error("invalid max-age expression: {0}")]
    BadMaxAge(String),

    /// A max-age expression resolved to a negative number of seconds.
    #[error("max-age resolves to a negative duration: {0} seconds")]
    NegativeMaxAge(i64),

    /// A configured route had an invalid target.
    #[error("invalid route `{route}`: {reason}")]
    BadRoute { route: String, reason: String },

    /// The configured host/port did not parse as a socket address.
    #[error("invalid listen address: {0}")]
    BadAddress(String),
}
