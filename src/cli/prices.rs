use super::ui;
use crate::core::aggregator::{self, BatchQuotes, SupportedCoins};
use crate::core::{CurrencyCode, PriceFeed, PriceQuote};
use anyhow::Result;
use comfy_table::{Cell, Row};

fn quote_row(quote: &PriceQuote) -> Row {
    Row::from(vec![
        Cell::new(quote.symbol.as_str()),
        ui::number_cell(quote.price()),
        ui::change_cell(quote.quote.change_24h),
        ui::number_cell(quote.quote.market_cap),
    ])
}

fn quote_header(currency: &CurrencyCode) -> Vec<Cell> {
    let currency = currency.as_str().to_uppercase();
    vec![
        ui::header_cell("Symbol"),
        ui::header_cell(&format!("Price ({currency})")),
        ui::header_cell("24h"),
        ui::header_cell(&format!("Market cap ({currency})")),
    ]
}

impl PriceQuote {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(quote_header(&self.currency));
        table.add_row(quote_row(self));
        table.to_string()
    }
}

impl BatchQuotes {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(quote_header(&self.currency));

        for (requested, result) in &self.per_symbol {
            match result {
                Ok(quote) => {
                    table.add_row(quote_row(quote));
                }
                Err(e) => {
                    table.add_row(vec![
                        Cell::new(requested),
                        ui::error_cell(&e.to_string()),
                        Cell::new(""),
                        Cell::new(""),
                    ]);
                }
            }
        }

        format!(
            "{}\n\n{}: {} of {}",
            table,
            ui::style_text("Fetched", ui::StyleType::TotalLabel),
            self.successes().count(),
            self.count
        )
    }
}

impl SupportedCoins {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Symbol")]);
        for symbol in &self.symbols {
            table.add_row(vec![Cell::new(symbol)]);
        }
        format!(
            "{}\n\n{}: {}",
            table,
            ui::style_text("Supported", ui::StyleType::TotalLabel),
            self.count
        )
    }
}

pub async fn run_price(feed: &PriceFeed, symbol: &str, currency: &CurrencyCode) -> Result<()> {
    let pb = ui::new_spinner("Fetching price...");
    let result = feed.get_price(symbol, currency).await;
    pb.finish_and_clear();

    println!("{}", result?.display_as_table());
    Ok(())
}

pub async fn run_prices(feed: &PriceFeed, symbols: &[String], currency: &CurrencyCode) -> Result<()> {
    let pb = ui::new_spinner("Fetching prices...");
    let batch = aggregator::get_many(feed, symbols, currency).await;
    pb.finish_and_clear();

    println!("{}", batch.display_as_table());
    Ok(())
}

pub fn run_coins(feed: &PriceFeed) -> Result<()> {
    println!("{}", aggregator::supported_coins(feed).display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::test_support::{StaticFetcher, feed_with};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_batch_table_shows_failures_inline() {
        let feed = feed_with(Arc::new(StaticFetcher::new(&[("bitcoin", 50000.0, 2.0)])));
        let symbols = vec!["BTC".to_string(), "ZZZ".to_string()];

        let batch = aggregator::get_many(&feed, &symbols, &CurrencyCode::new("usd")).await;
        let output = console::strip_ansi_codes(&batch.display_as_table()).to_string();

        assert!(output.contains("Price (USD)"));
        assert!(output.contains("50000.00"));
        assert!(output.contains("2.00%"));
        assert!(output.contains("unsupported symbol: ZZZ"));
        assert!(output.contains("Fetched: 1 of 2"));
    }

    #[test]
    fn test_supported_coins_table() {
        let feed = feed_with(Arc::new(StaticFetcher::new(&[])));
        let output = aggregator::supported_coins(&feed).display_as_table();
        let output = console::strip_ansi_codes(&output).to_string();

        assert!(output.contains("DOGE"));
        assert!(output.contains("Supported: 15"));
    }
}
