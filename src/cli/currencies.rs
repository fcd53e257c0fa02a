use super::ui;
use crate::core::{CatalogProvider, Currency};
use anyhow::{Result, anyhow};
use comfy_table::Cell;

/// Keeps currencies whose label contains `filter`, ignoring case.
pub fn filter_catalog<'a>(catalog: &'a [Currency], filter: Option<&str>) -> Vec<&'a Currency> {
    let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
    catalog
        .iter()
        .filter(|currency| {
            needle.is_empty() || currency.display_name.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn display_catalog(currencies: &[&Currency]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);

    for currency in currencies {
        table.add_row(vec![
            Cell::new(&currency.code),
            Cell::new(&currency.display_name),
        ]);
    }

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Currencies", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("{} currencies", currencies.len()),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run<C: CatalogProvider>(provider: &C, filter: Option<&str>) -> Result<()> {
    let spinner = ui::new_spinner();
    ui::start_spinner(&spinner, "Loading currencies".to_string());
    let outcome = provider.load_catalog().await;
    spinner.finish_and_clear();

    let catalog = outcome.map_err(|e| {
        anyhow!(
            "{} ({})",
            ui::style_text(
                "Unable to fetch currency data. Please try again later.",
                ui::StyleType::Error
            ),
            e
        )
    })?;

    let matches = filter_catalog(&catalog, filter);
    if matches.is_empty() {
        println!("No currencies match '{}'", filter.unwrap_or_default());
        return Ok(());
    }

    println!("{}", display_catalog(&matches));
    Ok(())
}
