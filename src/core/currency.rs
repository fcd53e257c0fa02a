//! Currency domain types and provider abstractions

use super::convert::parse_decimal;
use super::error::{RetrievalError, RetrievalOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency {
    /// Upper-cased currency code, unique within a catalog.
    pub code: String,
    /// Label shown to users, formatted as `"<CODE> - <name>"`.
    pub display_name: String,
}

impl Currency {
    pub fn new(code: &str, name: &str) -> Self {
        let code = code.to_uppercase();
        let display_name = format!("{code} - {name}");
        Currency { code, display_name }
    }
}

/// Snapshot of the provider's data to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotDate {
    #[default]
    Latest,
    On(NaiveDate),
}

impl Display for SnapshotDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotDate::Latest => write!(f, "latest"),
            SnapshotDate::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for SnapshotDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(SnapshotDate::Latest);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(SnapshotDate::On)
            .map_err(|_| {
                anyhow::anyhow!(
                    "Invalid snapshot date: {} (expected 'latest' or YYYY-MM-DD)",
                    s
                )
            })
    }
}

/// Rates published for one base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: String,
    /// Date reported by the provider for this table, if any.
    pub date: Option<NaiveDate>,
    rates: Map<String, Value>,
}

impl RateTable {
    pub fn new(base: &str, date: Option<NaiveDate>, rates: Map<String, Value>) -> Self {
        RateTable {
            base: base.to_uppercase(),
            date,
            rates,
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Looks up the rate for `target`, matching codes case-insensitively.
    pub fn rate(&self, target: &str) -> RetrievalOutcome<Decimal> {
        let key = target.to_lowercase();
        let value = self
            .rates
            .get(&key)
            .or_else(|| {
                self.rates
                    .iter()
                    .find(|(code, _)| code.eq_ignore_ascii_case(target))
                    .map(|(_, value)| value)
            })
            .ok_or_else(|| RetrievalError::RateNotFound {
                base: self.base.clone(),
                target: target.to_uppercase(),
            })?;

        parse_rate(value).ok_or_else(|| RetrievalError::InvalidRate {
            base: self.base.clone(),
            target: target.to_uppercase(),
            value: value.to_string(),
        })
    }

    /// All well-formed rates keyed by upper-cased target code.
    pub fn valid_rates(&self) -> impl Iterator<Item = (String, Decimal)> + '_ {
        self.rates
            .iter()
            .filter_map(|(code, value)| parse_rate(value).map(|rate| (code.to_uppercase(), rate)))
    }
}

// Exact decimal from the number's shortest round-trip text
fn parse_rate(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        _ => None,
    }
    .filter(|rate| *rate > Decimal::ZERO)
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn load_catalog(&self) -> RetrievalOutcome<Vec<Currency>>;
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn resolve_rate(&self, base: &str, target: &str) -> RetrievalOutcome<Decimal>;
}
