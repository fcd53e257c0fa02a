pub mod currency_api;
pub mod failover;

pub use currency_api::CurrencyApiProvider;
pub use failover::FailoverFetcher;
