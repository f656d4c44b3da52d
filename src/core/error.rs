use thiserror::Error;

use crate::core::params::Network;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A compiled-in constant disagrees with the value derived from it.
    /// Never recoverable: the binary's embedded parameters are inconsistent.
    #[error("{network} {what} mismatch: expected {expected}, derived {actual}")]
    ConfigurationIntegrity {
        network: Network,
        what: &'static str,
        expected: String,
        actual: String,
    },

    /// Conflicting network-selection flags.
    #[error("invalid network selection: {0}")]
    InvalidVariantSelection(String),

    /// A network id or name outside the known set.
    #[error("unsupported network: {0}")]
    UnsupportedVariant(String),
}

impl ParamsError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParamsError::InvalidVariantSelection(_))
    }
}
