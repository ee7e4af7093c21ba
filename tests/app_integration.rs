use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pricefeed::core::alerts::{AlertDirection, AlertEngine};
use pricefeed::core::{aggregator, valuation};
use pricefeed::core::{CurrencyCode, FetchError, OracleError, PriceFeed, QuoteCache, SymbolRegistry};
use pricefeed::providers::CoinGeckoFetcher;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn coin_response(id: &str, price: f64, change: f64, market_cap: f64) -> String {
        format!(
            r#"{{"{id}": {{"usd": {price}, "usd_24h_change": {change}, "usd_market_cap": {market_cap}}}}}"#
        )
    }

    pub async fn mount_coin(mock_server: &MockServer, id: &str, body: String) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", id))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub async fn create_mock_server(coins: &[(&str, f64, f64)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (id, price, change) in coins {
            mount_coin(
                &mock_server,
                id,
                coin_response(id, *price, *change, price * 19_000_000.0),
            )
            .await;
        }
        mock_server
    }
}

fn feed_for(base_url: &str, ttl: Duration) -> PriceFeed {
    let fetcher = CoinGeckoFetcher::new(base_url)
        .expect("Failed to build fetcher")
        .with_retries(0);
    PriceFeed::new(
        SymbolRegistry::default(),
        QuoteCache::new(ttl, Duration::from_secs(2)),
        Arc::new(fetcher),
    )
}

#[test_log::test(tokio::test)]
async fn test_alert_scenario_against_mock_source() {
    let mock_server = test_utils::create_mock_server(&[("bitcoin", 50000.0, 2.0)]).await;
    let feed = feed_for(&mock_server.uri(), Duration::ZERO);
    let mut engine = AlertEngine::new();
    let user = "0x1234";

    let first = engine.set_alert(user, "BTC", 49000.0, AlertDirection::Above);
    let check = engine.check_alerts(user, &feed).await;
    info!(?check, "First alert check");
    assert_eq!(check.triggered.len(), 1);
    assert_eq!(check.triggered[0].current_price, 50000.0);

    engine.set_alert(user, "BTC", 60000.0, AlertDirection::Above);
    let check = engine.check_alerts(user, &feed).await;
    assert_eq!(check.triggered.len(), 1);
    assert_eq!(check.triggered[0].rule_id, first.id);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_requests_hit_source_once() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "ethereum"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(test_utils::coin_response("ethereum", 2500.0, 1.0, 3.0e11))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let feed = feed_for(&mock_server.uri(), Duration::from_secs(60));
    let requests = ["eth", "ETH", "Eth", "eth", "ETH"].map(|s| feed.get_default_price(s));
    let results = futures::future::join_all(requests).await;

    let first = results[0].as_ref().expect("First request failed");
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
    // `expect(1)` is verified when the mock server is dropped
}

#[test_log::test(tokio::test)]
async fn test_batch_and_portfolio_isolate_failures() {
    let mock_server =
        test_utils::create_mock_server(&[("bitcoin", 50000.0, 2.0), ("solana", 150.0, -1.0)])
            .await;
    test_utils::mount_coin(&mock_server, "ethereum", r#"{"ethereum": {"usd": "n/a"}}"#.into())
        .await;
    let feed = feed_for(&mock_server.uri(), Duration::from_secs(60));
    let usd = CurrencyCode::new("USD");

    let symbols: Vec<String> = ["BTC", "ETH", "DOGE", "SOL"].map(String::from).to_vec();
    let batch = aggregator::get_many(&feed, &symbols, &usd).await;
    assert_eq!(batch.count, 4);
    assert!(batch.per_symbol[0].1.is_ok());
    assert!(matches!(
        batch.per_symbol[1].1,
        Err(OracleError::Fetch(FetchError::MalformedResponse(_)))
    ));
    // No mock mounted for dogecoin: wiremock answers 404
    assert!(matches!(
        batch.per_symbol[2].1,
        Err(OracleError::Fetch(FetchError::Unavailable(_)))
    ));
    assert!(batch.per_symbol[3].1.is_ok());

    let value =
        valuation::portfolio_value(&feed, [("BTC", 1.0), ("ETH", 10.0), ("SOL", 2.0)], &usd).await;
    assert_eq!(value.total_value, 50300.0);
    assert_eq!(value.breakdown.len(), 2);
}

fn write_config(mock_uri: &str, extra: &str) -> tempfile::NamedTempFile {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
user: "alice"
currency: "usd"
cache:
  ttl_secs: 30
  fetch_timeout_secs: 5
providers:
  coingecko:
    base_url: {mock_uri}
{extra}
"#
    );
    fs::write(config_file.path(), &config_content).expect("Failed to write config file");
    config_file
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server =
        test_utils::create_mock_server(&[("bitcoin", 50000.0, 2.0), ("ethereum", 2500.0, 1.0)])
            .await;

    let config_file = write_config(
        &mock_server.uri(),
        r#"
holdings:
  BTC: 0.5
  ETH: 2
  ZZZ: 1
alerts:
  - symbol: "BTC"
    threshold: 49000
    direction: above
  - symbol: "ETH"
    threshold: 2500
    direction: below
"#,
    );
    let config_path = config_file.path().to_str().unwrap();

    let commands = vec![
        pricefeed::AppCommand::Price {
            symbol: "btc".to_string(),
            currency: None,
        },
        pricefeed::AppCommand::Prices {
            symbols: vec!["BTC".to_string(), "ETH".to_string(), "ZZZ".to_string()],
            currency: Some("USD".to_string()),
        },
        pricefeed::AppCommand::Coins,
        pricefeed::AppCommand::Compare {
            symbol1: "BTC".to_string(),
            symbol2: "ETH".to_string(),
        },
        pricefeed::AppCommand::Above {
            symbol: "ETH".to_string(),
            threshold: 2000.0,
            currency: None,
        },
        pricefeed::AppCommand::Signal {
            symbol: "BTC".to_string(),
            ma_threshold: 52000.0,
        },
        pricefeed::AppCommand::Portfolio,
        pricefeed::AppCommand::Alerts,
    ];

    // Run app and verify success
    for command in commands {
        let result = pricefeed::run_command(command, Some(config_path)).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_unsupported_symbol_fails_single_price_command() {
    let mock_server = test_utils::create_mock_server(&[]).await;
    let config_file = write_config(&mock_server.uri(), "");

    let result = pricefeed::run_command(
        pricefeed::AppCommand::Price {
            symbol: "ZZZ".to_string(),
            currency: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Unsupported symbol should fail");
    assert_eq!(err.to_string(), "unsupported symbol: ZZZ");
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_reported() {
    let result = pricefeed::run_command(
        pricefeed::AppCommand::Coins,
        Some("/nonexistent/pricefeed/config.yaml"),
    )
    .await;

    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
