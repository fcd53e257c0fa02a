use super::failover::FailoverFetcher;
use crate::core::config::CurrencyApiConfig;
use crate::core::currency::{
    CatalogProvider, Currency, CurrencyRateProvider, RateTable, SnapshotDate,
};
use crate::core::error::RetrievalOutcome;
use crate::core::validate::Shape;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Client for the currency-api dataset, published on two mirrors with identical paths.
pub struct CurrencyApiProvider {
    primary_url: String,
    fallback_url: String,
    api_version: String,
    date: SnapshotDate,
    fetcher: FailoverFetcher,
}

impl CurrencyApiProvider {
    pub fn new(config: &CurrencyApiConfig) -> Result<Self> {
        Ok(CurrencyApiProvider {
            primary_url: config.primary_url.clone(),
            fallback_url: config.fallback_url.clone(),
            api_version: config.api_version.clone(),
            date: config.snapshot_date()?,
            fetcher: FailoverFetcher::new(config.timeout())?,
        })
    }

    pub fn with_date(mut self, date: SnapshotDate) -> Self {
        self.date = date;
        self
    }

    fn endpoint_url(&self, template: &str, endpoint: &str) -> String {
        let host = template.replace("{date}", &self.date.to_string());
        format!(
            "{}/{}/{}",
            host.trim_end_matches('/'),
            self.api_version,
            endpoint
        )
    }

    fn urls(&self, endpoint: &str) -> (String, String) {
        (
            self.endpoint_url(&self.primary_url, endpoint),
            self.endpoint_url(&self.fallback_url, endpoint),
        )
    }

    pub fn catalog_urls(&self) -> (String, String) {
        self.urls("currencies.json")
    }

    pub fn rate_table_urls(&self, base: &str) -> (String, String) {
        self.urls(&format!("currencies/{}.json", base.to_lowercase()))
    }

    #[instrument(name = "RateTableFetch", skip(self), fields(base = %base))]
    pub async fn fetch_rate_table(&self, base: &str) -> RetrievalOutcome<RateTable> {
        let key = base.to_lowercase();
        let (primary, fallback) = self.rate_table_urls(base);
        let mut payload = self
            .fetcher
            .fetch(&primary, &fallback, &Shape::ObjectWithKey(key.clone()))
            .await?;

        let date = payload
            .get("date")
            .and_then(Value::as_str)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        // Shape validation guarantees an object under `key`
        let rates = payload
            .get_mut(&key)
            .and_then(|rates| match rates.take() {
                Value::Object(rates) => Some(rates),
                _ => None,
            })
            .unwrap_or_default();

        debug!(count = rates.len(), ?date, "Fetched rate table");
        Ok(RateTable::new(base, date, rates))
    }
}

#[async_trait]
impl CatalogProvider for CurrencyApiProvider {
    #[instrument(name = "CatalogLoad", skip(self))]
    async fn load_catalog(&self) -> RetrievalOutcome<Vec<Currency>> {
        let (primary, fallback) = self.catalog_urls();
        let payload = self
            .fetcher
            .fetch(&primary, &fallback, &Shape::NonEmptyObject)
            .await?;

        let mut catalog = BTreeMap::new();
        if let Value::Object(entries) = payload {
            for (code, name) in entries {
                match name.as_str() {
                    Some(name) => {
                        let currency = Currency::new(&code, name);
                        catalog.insert(currency.code.clone(), currency);
                    }
                    None => debug!(%code, "Skipping catalog entry without a name"),
                }
            }
        }

        debug!(count = catalog.len(), "Loaded currency catalog");
        Ok(catalog.into_values().collect())
    }
}

#[async_trait]
impl CurrencyRateProvider for CurrencyApiProvider {
    #[instrument(name = "RateResolve", skip(self), fields(base = %base, target = %target))]
    async fn resolve_rate(&self, base: &str, target: &str) -> RetrievalOutcome<Decimal> {
        let table = self.fetch_rate_table(base).await?;
        table.rate(target)
    }
}
