//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod log;
pub mod orchestrator;
pub mod validate;

// Re-export main types for cleaner imports
pub use currency::{CatalogProvider, Currency, CurrencyRateProvider, RateTable, SnapshotDate};
pub use error::{ConversionError, RetrievalError, RetrievalOutcome};
pub use orchestrator::{ConversionInput, ConversionResult, Converter, ConverterState, Phase};
