//! Tests for the Binance client against a local mock server

#[cfg(test)]
mod tests {
    use binancewatch::config::{ExchangeConfig, WatchConfig};
    use binancewatch::exchange::{CandleSource, ExchangeClient, FetchError};
    use binancewatch::watcher::{ConsoleReporter, Termination, Watcher, WatcherState};
    use reqwest::StatusCode;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn kline(open_time: i64, close: &str) -> Value {
        json!([
            open_time,
            "50000.00000000",
            "50100.00000000",
            "49900.00000000",
            close,
            "3.21000000",
            open_time + 59_999,
            "160500.12000000",
            42,
            "1.50000000",
            "75000.00000000",
            "0"
        ])
    }

    fn client_for(server: &MockServer) -> ExchangeClient {
        ExchangeClient::new(&ExchangeConfig {
            base_url: format!("{}/api", server.uri()),
            api_version: "v3".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    // ============================================================================
    // Exchange client
    // ============================================================================

    #[tokio::test]
    async fn test_latest_candle_sends_limit_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("interval", "1m"))
            .and(query_param("limit", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([kline(1_700_000_040_000, "50012.34000000")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let candle = client_for(&server)
            .latest_candle("btcusdt", "1m")
            .await
            .unwrap();

        assert_eq!(candle.open_time, 1_700_000_040_000);
        assert_eq!(candle.close, dec!(50012.34));
        assert_eq!(candle.num_trades, 42);
    }

    #[tokio::test]
    async fn test_latest_candle_takes_first_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                kline(1_700_000_040_000, "50001.00000000"),
                kline(1_700_000_100_000, "50002.00000000"),
            ])))
            .mount(&server)
            .await;

        let candle = client_for(&server)
            .latest_candle("BTCUSDT", "1m")
            .await
            .unwrap();

        assert_eq!(candle.open_time, 1_700_000_040_000);
        assert_eq!(candle.close, dec!(50001.00));
    }

    #[tokio::test]
    async fn test_invalid_symbol_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .latest_candle("NOPE", "1m")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(err.to_string().contains("Invalid symbol."));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_empty_array_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .latest_candle("BTCUSDT", "1m")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Empty));
    }

    #[tokio::test]
    async fn test_short_row_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[1000, "1.0", "1.0"]])),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .latest_candle("BTCUSDT", "1m")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedCandle(_)));
        assert!(err.is_payload());
    }

    #[tokio::test]
    async fn test_non_json_body_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .latest_candle("BTCUSDT", "1m")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = ExchangeClient::new(&ExchangeConfig {
            base_url: "http://127.0.0.1:1/api".to_string(),
            api_version: "v3".to_string(),
            request_timeout_secs: 2,
        })
        .unwrap();

        let err = client.latest_candle("BTCUSDT", "1m").await.unwrap_err();
        assert!(err.is_transport());
    }

    // ============================================================================
    // Watcher over HTTP
    // ============================================================================

    #[tokio::test]
    async fn test_watcher_stops_when_exchange_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([kline(60_000, "50000.00000000")])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
            )
            .mount(&server)
            .await;

        let config = WatchConfig {
            poll_interval_ms: 10,
            ..WatchConfig::default()
        };
        let mut watcher = Watcher::new(
            client_for(&server),
            ConsoleReporter::new(Vec::new()),
            config,
        );

        let termination = watcher.run_until(std::future::pending()).await;

        match termination {
            Termination::FetchFailed(err) => {
                assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST))
            }
            other => panic!("unexpected termination: {:?}", other),
        }
        assert_eq!(watcher.state(), WatcherState::Terminated);

        let output = String::from_utf8(watcher.into_reporter().into_inner()).unwrap();
        assert!(output.starts_with(
            "\n\n---New 1m interval started---\n\rTrading Pair: BTCUSDT, 1m average: 50000.00"
        ));
        assert!(output.contains("Error: exchange returned HTTP 400 Bad Request"));
        assert!(output.ends_with("Is this a valid trading pair?\n"));
    }
}
