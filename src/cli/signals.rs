use super::ui;
use crate::core::aggregator::{self, Comparison};
use crate::core::valuation::{self, BuySignal, ThresholdCheck};
use crate::core::{CurrencyCode, PriceFeed};
use anyhow::Result;
use comfy_table::Cell;

impl Comparison {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("Price")]);
        table.add_row(vec![
            Cell::new(self.symbol1.as_str()),
            ui::number_cell(self.price1),
        ]);
        table.add_row(vec![
            Cell::new(self.symbol2.as_str()),
            ui::number_cell(self.price2),
        ]);

        format!(
            "{}\n\n{}: {}\n{}: {}",
            table,
            ui::style_text(&self.pair, ui::StyleType::TotalLabel),
            ui::format_amount(self.ratio),
            ui::style_text("Higher", ui::StyleType::TotalLabel),
            ui::style_text(self.higher.as_str(), ui::StyleType::TotalValue)
        )
    }
}

impl ThresholdCheck {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Price"),
            ui::header_cell("Threshold"),
            ui::header_cell("Above"),
            ui::header_cell("Difference"),
            ui::header_cell("Diff (%)"),
        ]);
        table.add_row(vec![
            Cell::new(self.symbol.as_str()),
            ui::number_cell(self.current_price),
            ui::number_cell(self.threshold),
            ui::flag_cell(self.is_above),
            ui::number_cell(self.difference),
            ui::change_cell(self.percentage_diff),
        ]);
        table.to_string()
    }
}

impl BuySignal {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Price"),
            ui::header_cell("MA threshold"),
            ui::header_cell("24h"),
            ui::header_cell("Buy"),
        ]);
        table.add_row(vec![
            Cell::new(self.symbol.as_str()),
            ui::number_cell(self.current_price),
            ui::number_cell(self.ma_threshold),
            ui::change_cell(self.change_24h),
            ui::flag_cell(self.should_buy),
        ]);

        let reason_style = if self.should_buy {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Subtle
        };
        format!("{}\n\n{}", table, ui::style_text(&self.reason, reason_style))
    }
}

pub async fn run_compare(feed: &PriceFeed, symbol1: &str, symbol2: &str) -> Result<()> {
    let comparison = aggregator::compare(feed, symbol1, symbol2).await?;
    println!("{}", comparison.display_as_table());
    Ok(())
}

pub async fn run_above(
    feed: &PriceFeed,
    symbol: &str,
    threshold: f64,
    currency: &CurrencyCode,
) -> Result<()> {
    let check = valuation::is_above(feed, symbol, threshold, currency).await?;
    println!("{}", check.display_as_table());
    Ok(())
}

pub async fn run_signal(feed: &PriceFeed, symbol: &str, ma_threshold: f64) -> Result<()> {
    let signal = valuation::buy_signal(feed, symbol, ma_threshold).await?;
    println!("{}", signal.display_as_table());
    Ok(())
}
