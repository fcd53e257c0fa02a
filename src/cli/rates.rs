use super::ui;
use crate::core::RateTable;
use crate::providers::CurrencyApiProvider;
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color};

/// Renders `table`, limited to `targets` when any are given.
pub fn display_rate_table(table: &RateTable, targets: &[String]) -> String {
    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {})", table.base)),
    ]);

    if targets.is_empty() {
        let mut rates: Vec<_> = table.valid_rates().collect();
        rates.sort();
        for (code, rate) in rates {
            output.add_row(vec![Cell::new(code), ui::right_cell(rate)]);
        }
    } else {
        for target in targets {
            let rate_cell = match table.rate(target) {
                Ok(rate) => ui::right_cell(rate),
                Err(e) => Cell::new(e.to_string()).fg(Color::Red),
            };
            output.add_row(vec![Cell::new(target.to_uppercase()), rate_cell]);
        }
    }

    let date = table
        .date
        .map_or("unknown date".to_string(), |d| d.format("%Y-%m-%d").to_string());

    format!(
        "Rates for {} {}\n\n{}",
        ui::style_text(&table.base, ui::StyleType::Title),
        ui::style_text(&format!("({date})"), ui::StyleType::Subtle),
        output
    )
}

pub async fn run(provider: &CurrencyApiProvider, base: &str, targets: &[String]) -> Result<()> {
    let spinner = ui::new_spinner();
    ui::start_spinner(&spinner, format!("Fetching rates for {}", base.to_uppercase()));
    let outcome = provider.fetch_rate_table(base).await;
    spinner.finish_and_clear();

    let table = outcome.map_err(|e| {
        anyhow!(
            "{} ({})",
            ui::style_text(
                "Unable to fetch conversion rates. Please try again later.",
                ui::StyleType::Error
            ),
            e
        )
    })?;

    println!("{}", display_rate_table(&table, targets));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn table() -> RateTable {
        let rates = json!({"usd": 1.1, "gbp": 0.85, "bad": "x"});
        RateTable::new(
            "eur",
            NaiveDate::from_ymd_opt(2024, 3, 6),
            rates.as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn test_display_all_rates() {
        let output = display_rate_table(&table(), &[]);
        assert!(output.contains("Rate (1 EUR)"));
        assert!(output.contains("USD"));
        assert!(output.contains("0.85"));
        assert!(output.contains("2024-03-06"));
        assert!(!output.contains("BAD"));
    }

    #[test]
    fn test_display_selected_rates() {
        let output = display_rate_table(&table(), &["usd".to_string(), "inr".to_string()]);
        assert!(output.contains("1.1"));
        assert!(output.contains("INR"));
        assert!(output.contains("target currency rate not found"));
        assert!(!output.contains("GBP"));
    }
}
