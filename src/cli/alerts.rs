use super::ui;
use crate::core::alerts::{AlertCheck, AlertEngine};
use crate::core::config::AlertConfig;
use crate::core::PriceFeed;
use anyhow::Result;
use comfy_table::Cell;

impl AlertCheck {
    pub fn display_as_table(&self) -> String {
        if self.triggered.is_empty() {
            return ui::style_text("No alerts triggered", ui::StyleType::Subtle);
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Id"),
            ui::header_cell("Symbol"),
            ui::header_cell("Direction"),
            ui::header_cell("Threshold"),
            ui::header_cell("Price"),
        ]);
        for alert in &self.triggered {
            table.add_row(vec![
                Cell::new(alert.rule_id),
                Cell::new(&alert.symbol),
                Cell::new(alert.direction),
                ui::number_cell(alert.threshold),
                ui::number_cell(alert.current_price),
            ]);
        }

        format!(
            "{}\n\n{}: {}",
            table,
            ui::style_text("Triggered", ui::StyleType::TotalLabel),
            self.triggered.len()
        )
    }
}

/// Registers the configured rules for `user` and reports which ones trigger.
pub async fn run(feed: &PriceFeed, user: &str, rules: &[AlertConfig]) -> Result<()> {
    if rules.is_empty() {
        println!("No alerts set.");
        return Ok(());
    }

    let mut engine = AlertEngine::new();
    for rule in rules {
        engine.set_alert(user, &rule.symbol, rule.threshold, rule.direction);
    }

    let pb = ui::new_spinner("Checking alerts...");
    let check = engine.check_alerts(user, feed).await;
    pb.finish_and_clear();

    println!(
        "Alerts for {}\n",
        ui::style_text(user, ui::StyleType::Title)
    );
    println!("{}", check.display_as_table());
    Ok(())
}
