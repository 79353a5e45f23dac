use fxq::core::{Pair, QuoteError, QuoteStore};
use fxq::providers::frankfurter::FrankfurterProvider;
use fxq::quotation::QuoteService;
use fxq::refresh::refresh_all;
use fxq::store::FjallQuoteStore;
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_rate(mock_server: &MockServer, from: &str, to: &str, rate: &str) {
        let body = format!(r#"{{"amount":1.0,"base":"{from}","date":"2024-05-10","rates":{{"{to}":{rate}}}}}"#);
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", from))
            .and(query_param("to", to))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub async fn mount_failure(mock_server: &MockServer, from: &str, to: &str) {
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", from))
            .and(query_param("to", to))
            .respond_with(ResponseTemplate::new(500))
            .mount(mock_server)
            .await;
    }

    pub fn write_config(
        dir: &std::path::Path,
        base_url: &str,
        freshness_secs: u64,
    ) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
currencies: ["EUR", "USD", "MXN"]
freshness_secs: {freshness_secs}
call_timeout_secs: 5
provider: frankfurter
providers:
  frankfurter:
    base_url: {base_url}
data_path: {}
"#,
            dir.join("data").display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn pair(s: &str) -> Pair {
    s.parse().unwrap()
}

fn service(store: Arc<FjallQuoteStore>, base_url: &str, freshness: Duration) -> QuoteService {
    let source = Arc::new(FrankfurterProvider::new(base_url).unwrap());
    QuoteService::new(store, source, freshness, Duration::from_secs(5))
}

#[test_log::test(tokio::test)]
async fn test_request_quote_reuses_fresh_quote_from_disk_store() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rate(&mock_server, "EUR", "USD", "1.0783").await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FjallQuoteStore::open(dir.path()).unwrap());
    let service = service(store.clone(), &mock_server.uri(), Duration::from_secs(300));

    let first = service.request_quote(&pair("EUR/USD")).await.unwrap();
    let second = service.request_quote(&pair("EUR/USD")).await.unwrap();
    assert_eq!(first, second);

    let quote = service.get_by_id(first).await.unwrap();
    assert_eq!(quote.rate, Decimal::from_str("1.0783").unwrap());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_zero_window_always_fetches() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rate(&mock_server, "EUR", "USD", "1.0783").await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FjallQuoteStore::open(dir.path()).unwrap());
    let service = service(store, &mock_server.uri(), Duration::ZERO);

    let first = service.request_quote(&pair("EUR/USD")).await.unwrap();
    let second = service.request_quote(&pair("EUR/USD")).await.unwrap();
    assert_ne!(first, second);

    let latest = service.resolve_latest(&pair("EUR/USD")).await.unwrap();
    assert_eq!(latest.id, second);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_resolve_latest_bootstraps_empty_store() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rate(&mock_server, "EUR", "MXN", "18.25").await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FjallQuoteStore::open(dir.path()).unwrap());
    let service = service(store.clone(), &mock_server.uri(), Duration::from_secs(5));

    let quote = service.resolve_latest(&pair("EUR/MXN")).await.unwrap();
    info!(?quote, "Bootstrapped quote");

    assert_eq!(quote.pair, pair("EUR/MXN"));
    assert_eq!(quote.rate, Decimal::from_str("18.25").unwrap());
    assert_eq!(store.list_registered_pairs().await.unwrap(), vec![pair("EUR/MXN")]);
    assert_eq!(store.get_latest_quote(&pair("EUR/MXN")).await.unwrap(), Some(quote));
}

#[test_log::test(tokio::test)]
async fn test_refresh_all_isolates_failing_pair() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rate(&mock_server, "EUR", "USD", "1.0783").await;
    test_utils::mount_failure(&mock_server, "EUR", "MXN").await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FjallQuoteStore::open(dir.path()).unwrap());
    store.ensure_pair_registered(&pair("EUR/USD")).await.unwrap();
    store.ensure_pair_registered(&pair("EUR/MXN")).await.unwrap();
    let service = service(store.clone(), &mock_server.uri(), Duration::from_secs(5));

    let report = refresh_all(&service).await;

    assert_eq!(report.refreshed.len(), 1);
    assert_eq!(report.refreshed[0].pair, pair("EUR/USD"));
    assert_eq!(report.failed.len(), 1);
    let (failed_pair, err) = &report.failed[0];
    assert_eq!(failed_pair, &pair("EUR/MXN"));
    assert!(matches!(err, QuoteError::UpstreamFetch { .. }));

    assert!(store.get_latest_quote(&pair("EUR/USD")).await.unwrap().is_some());
    assert!(store.get_latest_quote(&pair("EUR/MXN")).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rate(&mock_server, "EUR", "USD", "1.0783").await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri(), 300);
    let config_path = config_path.to_str().unwrap();

    for command in [
        fxq::AppCommand::Quote("eur/usd".to_string()),
        fxq::AppCommand::Latest("EUR/USD".to_string()),
        fxq::AppCommand::Pairs,
        fxq::AppCommand::Refresh,
    ] {
        let result = fxq::run_command(command, Some(config_path)).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }

    // quote + latest share one fetch, refresh always fetches
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    assert!(fs::metadata(dir.path().join("data")).unwrap().is_dir());
}

#[test_log::test(tokio::test)]
async fn test_app_rejects_invalid_pairs() {
    let mock_server = wiremock::MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri(), 5);
    let config_path = config_path.to_str().unwrap();

    for input in ["EUR/EUR", "EURUSD", "EUR/GBP"] {
        let err = fxq::run_command(fxq::AppCommand::Quote(input.to_string()), Some(config_path))
            .await
            .unwrap_err();
        let quote_error = err
            .downcast_ref::<QuoteError>()
            .expect("validation failures are quote errors");
        assert!(quote_error.is_client_error(), "{input}: {quote_error}");
    }

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
#[ignore = "hits the public Frankfurter API"]
async fn test_real_frankfurter_api() {
    use fxq::core::RateSource;

    let provider = FrankfurterProvider::new("https://api.frankfurter.app").unwrap();
    let eur_usd = pair("EUR/USD");
    info!(pair = %eur_usd, "Fetching rate from Frankfurter");

    match provider.fetch_rate(&eur_usd).await {
        Ok(rate) => {
            info!(%rate, "Received successful rate response");
            assert!(rate > Decimal::ZERO, "Rate should be positive");
        }
        Err(e) => {
            error!("Rate API request failed: {e}\n{e:?}");
            panic!("Rate API request failed: {e}");
        }
    }
}
