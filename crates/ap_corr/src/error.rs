//! Aperture correction error types

use contracts::ContractError;
use thiserror::Error;

/// Aperture correction specific error
#[derive(Debug, Error)]
pub enum ApCorrError {
    /// Required flux fields missing or mistyped
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Result alias
pub type Result<T> = std::result::Result<T, ApCorrError>;
