use super::ui;
use crate::core::valuation::{self, PortfolioValue};
use crate::core::{CurrencyCode, PriceFeed};
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeMap;

impl PortfolioValue {
    pub fn display_as_table(&self) -> String {
        let currency = self.currency.as_str().to_uppercase();

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Amount"),
            ui::header_cell("Price"),
            ui::header_cell(&format!("Value ({currency})")),
            ui::header_cell("Weight (%)"),
        ]);

        for (symbol, holding) in &self.breakdown {
            let weight = if self.total_value > 0.0 {
                holding.value / self.total_value * 100.0
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new(symbol.as_str()),
                ui::number_cell(holding.amount),
                ui::number_cell(holding.price),
                ui::number_cell(holding.value),
                ui::number_cell(weight),
            ]);
        }

        let mut output = table.to_string();

        // Total value at bottom
        output.push_str(&format!(
            "\n\nTotal Value ({}): {}",
            ui::style_text(&currency, ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_value), ui::StyleType::TotalValue)
        ));

        output
    }
}

pub async fn run(
    feed: &PriceFeed,
    holdings: &BTreeMap<String, f64>,
    currency: &CurrencyCode,
) -> Result<()> {
    if holdings.is_empty() {
        println!("No holdings configured.");
        return Ok(());
    }

    let pb = ui::new_spinner("Valuing holdings...");
    let value = valuation::portfolio_value(
        feed,
        holdings.iter().map(|(symbol, amount)| (symbol.as_str(), *amount)),
        currency,
    )
    .await;
    pb.finish_and_clear();

    println!("{}", value.display_as_table());

    let skipped: Vec<_> = holdings
        .keys()
        .filter(|symbol| {
            feed.registry()
                .normalize(symbol)
                .map_or(true, |s| !value.breakdown.contains_key(&s))
        })
        .map(String::as_str)
        .collect();
    if !skipped.is_empty() {
        println!(
            "\n{}",
            ui::style_text(
                &format!("Not valued: {}", skipped.join(", ")),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
