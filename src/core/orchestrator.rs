//! Sequences input validation, rate resolution and conversion for a single request

use super::convert::{convert, parse_decimal};
use super::currency::CurrencyRateProvider;
use super::error::ConversionError;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Raw values as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionInput {
    pub amount: String,
    pub base_currency: String,
    pub target_currency: String,
}

impl ConversionInput {
    pub fn new(
        amount: impl Into<String>,
        base_currency: impl Into<String>,
        target_currency: impl Into<String>,
    ) -> Self {
        ConversionInput {
            amount: amount.into(),
            base_currency: base_currency.into(),
            target_currency: target_currency.into(),
        }
    }

    /// Exchanges the base and target currencies.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.base_currency, &mut self.target_currency);
    }

    /// Checks the input without touching the network.
    pub fn validate(&self) -> Result<ConversionRequest, ConversionError> {
        let amount = parse_amount(&self.amount)?;

        let base_currency = self.base_currency.trim().to_uppercase();
        let target_currency = self.target_currency.trim().to_uppercase();
        if base_currency.is_empty() || target_currency.is_empty() {
            return Err(ConversionError::MissingCurrency);
        }
        if base_currency == target_currency {
            return Err(ConversionError::SameCurrency {
                code: base_currency,
            });
        }

        Ok(ConversionRequest {
            amount,
            base_currency,
            target_currency,
        })
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, ConversionError> {
    let amount = parse_decimal(raw.trim()).ok_or_else(|| ConversionError::InvalidAmount {
        input: raw.to_string(),
    })?;

    // Must still carry cents at a rate of one
    if convert(amount, Decimal::ONE).is_none() {
        return Err(ConversionError::AmountOutOfRange {
            amount: amount.to_string(),
        });
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub amount: Decimal,
    pub base_currency: String,
    pub target_currency: String,
    /// Always carries exactly two decimal places.
    pub converted_amount: Decimal,
}

impl Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount, self.base_currency, self.converted_amount, self.target_currency
        )
    }
}

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub base_currency: String,
    pub target_currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Resolving,
    Computing,
    Done,
    Failed,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Phase::Idle => "Idle",
                Phase::Validating => "Validating input",
                Phase::Resolving => "Fetching exchange rate",
                Phase::Computing => "Converting",
                Phase::Done => "Done",
                Phase::Failed => "Failed",
            }
        )
    }
}

/// Observable state of a [`Converter`], as rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConverterState {
    pub phase: Phase,
    /// True exactly while the rate is being resolved or the result computed.
    pub loading: bool,
    pub last_result: Option<ConversionResult>,
    pub last_error: Option<String>,
}

pub struct Converter<P> {
    provider: P,
    state: watch::Sender<ConverterState>,
    latest: AtomicU64,
}

impl<P> Converter<P> {
    pub fn state(&self) -> ConverterState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<ConverterState> {
        self.state.subscribe()
    }

    // Only the most recent submission may write state
    fn update(&self, generation: u64, modify: impl FnOnce(&mut ConverterState)) {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != generation {
                return false;
            }
            modify(state);
            true
        });
    }

    fn fail(&self, generation: u64, error: &ConversionError) {
        self.update(generation, |state| {
            state.phase = Phase::Failed;
            state.loading = false;
            state.last_error = Some(error.to_string());
        });
    }
}

impl<P: CurrencyRateProvider> Converter<P> {
    pub fn new(provider: P) -> Self {
        let (state, _) = watch::channel(ConverterState::default());
        Converter {
            provider,
            state,
            latest: AtomicU64::new(0),
        }
    }

    #[instrument(
        name = "SubmitConversion",
        skip(self, input),
        fields(amount = %input.amount, base = %input.base_currency, target = %input.target_currency)
    )]
    pub async fn submit(&self, input: &ConversionInput) -> Result<ConversionResult, ConversionError> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(generation, |state| {
            state.phase = Phase::Validating;
            state.loading = false;
            state.last_result = None;
            state.last_error = None;
        });

        let request = match input.validate() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Rejected conversion input");
                self.fail(generation, &e);
                return Err(e);
            }
        };

        let guard = LoadingGuard::enter(self, generation);
        let rate = match self
            .provider
            .resolve_rate(&request.base_currency, &request.target_currency)
            .await
        {
            Ok(rate) => rate,
            Err(e) => {
                let e = ConversionError::from(e);
                warn!(error = %e, "Conversion failed");
                guard.fail(&e);
                return Err(e);
            }
        };

        guard.computing();
        let Some(converted_amount) = convert(request.amount, rate) else {
            let e = ConversionError::AmountOutOfRange {
                amount: request.amount.to_string(),
            };
            warn!(error = %e, %rate, "Conversion failed");
            guard.fail(&e);
            return Err(e);
        };
        let result = ConversionResult {
            converted_amount,
            amount: request.amount,
            base_currency: request.base_currency,
            target_currency: request.target_currency,
        };
        debug!(%rate, converted = %result.converted_amount, "Conversion done");
        guard.done(&result);

        Ok(result)
    }
}

/// Holds `loading` for the lifetime of a submission and releases it on every exit path.
struct LoadingGuard<'a, P> {
    converter: &'a Converter<P>,
    generation: u64,
    settled: bool,
}

impl<'a, P> LoadingGuard<'a, P> {
    fn enter(converter: &'a Converter<P>, generation: u64) -> Self {
        converter.update(generation, |state| {
            state.phase = Phase::Resolving;
            state.loading = true;
        });
        LoadingGuard {
            converter,
            generation,
            settled: false,
        }
    }

    fn computing(&self) {
        self.converter.update(self.generation, |state| {
            state.phase = Phase::Computing;
        });
    }

    fn done(mut self, result: &ConversionResult) {
        self.settled = true;
        self.converter.update(self.generation, |state| {
            state.phase = Phase::Done;
            state.loading = false;
            state.last_result = Some(result.clone());
        });
    }

    fn fail(mut self, error: &ConversionError) {
        self.settled = true;
        self.converter.fail(self.generation, error);
    }
}

impl<P> Drop for LoadingGuard<'_, P> {
    fn drop(&mut self) {
        if !self.settled {
            // Submission was dropped mid-flight
            self.converter.update(self.generation, |state| {
                state.phase = Phase::Idle;
                state.loading = false;
            });
        }
    }
}
