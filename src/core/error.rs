//! Error taxonomy for retrieval and conversion

use thiserror::Error;

/// Why a decoded payload was rejected by the response validator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("payload is not an object")]
    NotAnObject,
    #[error("payload is an empty mapping")]
    EmptyMapping,
    #[error("payload is missing key '{key}'")]
    MissingKey { key: String },
    #[error("value at key '{key}' is not an object")]
    KeyNotAnObject { key: String },
}

/// Failure of a single request against one mirror.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("unparseable response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("invalid payload from {url}: {source}")]
    Shape {
        url: String,
        #[source]
        source: ShapeError,
    },
}

/// Terminal failure of a retrieval against the provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("both sources unavailable")]
    BothSourcesUnavailable {
        primary: AttemptError,
        fallback: AttemptError,
    },
    #[error("target currency rate not found")]
    RateNotFound { base: String, target: String },
    #[error("invalid rate value")]
    InvalidRate {
        base: String,
        target: String,
        value: String,
    },
}

/// Result of a provider retrieval: `Ok` on success, `Err` with the reason otherwise.
pub type RetrievalOutcome<T> = Result<T, RetrievalError>;

/// Errors surfaced by the conversion orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Please enter a valid number for the amount (got '{input}').")]
    InvalidAmount { input: String },
    #[error("Base and target currencies cannot be the same ({code}).")]
    SameCurrency { code: String },
    #[error("Please select both a base and a target currency.")]
    MissingCurrency,
    #[error("Amount {amount} is too large to convert.")]
    AmountOutOfRange { amount: String },
    #[error("Unable to fetch conversion rates: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl ConversionError {
    /// True when the failure comes from the entered values rather than the rate provider.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ConversionError::Retrieval(_))
    }
}
