//! Per-user threshold alerts evaluated against live quotes.

use crate::core::error::{OracleError, Result};
use crate::core::feed::PriceFeed;
use anyhow::anyhow;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl AlertDirection {
    /// `Below` is the exact negation of `Above`, so a price equal to the
    /// threshold triggers `Below`.
    pub fn is_triggered(&self, current_price: f64, threshold: f64) -> bool {
        let is_above = current_price > threshold;
        match self {
            AlertDirection::Above => is_above,
            AlertDirection::Below => !is_above,
        }
    }
}

impl Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AlertDirection::Above => "above",
                AlertDirection::Below => "below",
            }
        )
    }
}

impl FromStr for AlertDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            _ => Err(anyhow!("Invalid alert direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: u64,
    /// Stored as given; support is checked when the rule is evaluated.
    pub symbol: String,
    pub threshold: f64,
    pub direction: AlertDirection,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredAlert {
    pub rule_id: u64,
    pub symbol: String,
    pub threshold: f64,
    pub direction: AlertDirection,
    pub current_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertCheck {
    pub triggered: Vec<TriggeredAlert>,
}

/// Alert rules keyed by the caller identity supplied by the host.
#[derive(Debug, Default)]
pub struct AlertEngine {
    rules: HashMap<String, Vec<AlertRule>>,
    next_id: u64,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alert(
        &mut self,
        user: &str,
        symbol: &str,
        threshold: f64,
        direction: AlertDirection,
    ) -> AlertRule {
        self.next_id += 1;
        let rule = AlertRule {
            id: self.next_id,
            symbol: symbol.to_string(),
            threshold,
            direction,
            active: true,
        };
        debug!(user, "Alert set: {} {} {}", symbol, direction, threshold);
        self.rules
            .entry(user.to_string())
            .or_default()
            .push(rule.clone());
        rule
    }

    pub fn list_alerts(&self, user: &str) -> &[AlertRule] {
        self.rules.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    /// Retires a rule so it is skipped by later checks. Rules are never removed.
    pub fn deactivate(&mut self, user: &str, rule_id: u64) -> Result<AlertRule> {
        let rule = self
            .rules
            .get_mut(user)
            .and_then(|rules| rules.iter_mut().find(|rule| rule.id == rule_id))
            .ok_or(OracleError::UnknownAlert { id: rule_id })?;
        rule.active = false;
        Ok(rule.clone())
    }

    /// Evaluates the user's active rules in insertion order. Rules whose
    /// price cannot be fetched are left out of the result.
    pub async fn check_alerts(&self, user: &str, feed: &PriceFeed) -> AlertCheck {
        let active = self.list_alerts(user).iter().filter(|rule| rule.active);

        let evaluations = active.map(|rule| async move {
            match feed.get_default_price(&rule.symbol).await {
                Ok(quote) => {
                    let current_price = quote.price();
                    rule.direction
                        .is_triggered(current_price, rule.threshold)
                        .then(|| TriggeredAlert {
                            rule_id: rule.id,
                            symbol: rule.symbol.clone(),
                            threshold: rule.threshold,
                            direction: rule.direction,
                            current_price,
                        })
                }
                Err(e) => {
                    debug!("Skipping alert {} for {}: {}", rule.id, rule.symbol, e);
                    None
                }
            }
        });

        let triggered = join_all(evaluations).await.into_iter().flatten().collect();
        AlertCheck { triggered }
    }
}
