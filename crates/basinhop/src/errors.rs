use thiserror::Error;

/// A result type for basin-hopping errors
pub type Result<T> = std::result::Result<T, HopError>;

/// An error for basin-hopping global optimization
#[derive(Error, Debug)]
pub enum HopError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
    /// When an Argmin framework error is raised, objective function errors included
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
}
