use super::ui;
use crate::core::{
    ConversionError, ConversionInput, ConversionResult, Converter, CurrencyRateProvider,
};
use anyhow::Result;

pub fn display_result(result: &ConversionResult) -> String {
    ui::style_text(&result.to_string(), ui::StyleType::Result)
}

/// Submits `input`, showing a spinner for as long as the converter reports `loading`.
pub async fn submit_with_progress<P: CurrencyRateProvider>(
    converter: &Converter<P>,
    input: &ConversionInput,
) -> Result<ConversionResult, ConversionError> {
    let mut state_rx = converter.subscribe();
    let spinner = ui::new_spinner();

    let submission = converter.submit(input);
    tokio::pin!(submission);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submission => break outcome,
            Ok(()) = state_rx.changed() => {
                let (loading, phase) = {
                    let state = state_rx.borrow_and_update();
                    (state.loading, state.phase)
                };
                if loading {
                    ui::start_spinner(&spinner, phase.to_string());
                }
            }
        }
    };

    spinner.finish_and_clear();
    outcome
}

pub async fn run<P: CurrencyRateProvider>(
    converter: &Converter<P>,
    input: &ConversionInput,
) -> Result<()> {
    let result = submit_with_progress(converter, input).await?;
    println!("{}", display_result(&result));
    Ok(())
}
