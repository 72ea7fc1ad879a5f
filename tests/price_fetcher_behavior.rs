//! Behavior tests for batch close-price retrieval.
//!
//! The chart endpoint is scripted over HTTP; the quote-history fallback is a
//! fake source so no test touches the network.

use std::sync::Arc;

use serde_json::json;
use tickwatch_core::{
    HttpError, ObservationStatus, ProviderId, SourceError, UnavailableReason, ValidationError,
};
use tickwatch_tests::{chart_body, fetcher, symbols, FakeHistory, ScriptedHttpClient};

// =============================================================================
// Cardinality and ordering
// =============================================================================

#[tokio::test]
async fn one_bad_ticker_does_not_spoil_the_batch() {
    // Given: AAPL has data but BADTICKER is unknown to both sources
    let http = Arc::new(
        ScriptedHttpClient::new()
            .on("chart/AAPL?", chart_body(json!([189.1, 190.5])))
            .on_status("chart/BADTICKER?", 404),
    );
    let history = Arc::new(FakeHistory::empty());
    let fetcher = fetcher(http, history);

    // When: The dashboard refreshes both
    let observations = fetcher
        .fetch_close_prices(&symbols(&["AAPL", "BADTICKER"]))
        .await
        .expect("valid batch");

    // Then: One ok and one unavailable, in request order
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].ticker.as_str(), "AAPL");
    assert_eq!(observations[0].status(), ObservationStatus::Ok);
    assert_eq!(observations[0].close_price(), Some(190.5));
    assert_eq!(observations[1].ticker.as_str(), "BADTICKER");
    assert_eq!(observations[1].status(), ObservationStatus::Unavailable);
    assert_eq!(observations[1].close_price(), None);
    assert_eq!(
        observations[1].reason(),
        Some(UnavailableReason::FetchFailed)
    );
}

#[tokio::test]
async fn cardinality_and_order_hold_for_any_failure_mix() {
    // Given: A mix of healthy, gapped, failing and timing-out tickers
    let http = Arc::new(
        ScriptedHttpClient::new()
            .on("chart/AAPL?", chart_body(json!([190.5])))
            .on("chart/MSFT?", chart_body(json!([null, null])))
            .on_status("chart/TSLA?", 503)
            .on_error("chart/NVDA?", HttpError::timeout("deadline elapsed"))
            .on("chart/2330.TW?", chart_body(json!([880.0, null]))),
    );
    let history = Arc::new(FakeHistory::empty().with("NVDA", Ok(121.4)));
    let requested = ["AAPL", "MSFT", "TSLA", "NVDA", "2330.TW", "AAPL"];

    for max_in_flight in [1, 2, 8] {
        let fetcher = fetcher(http.clone(), history.clone()).with_max_in_flight(max_in_flight);

        // When: The batch is resolved with varying concurrency
        let observations = fetcher
            .fetch_close_prices(&symbols(&requested))
            .await
            .expect("valid batch");

        // Then: Output mirrors input one-to-one
        let tickers = observations
            .iter()
            .map(|o| o.ticker.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tickers, requested);

        let prices = observations
            .iter()
            .map(|o| o.close_price())
            .collect::<Vec<_>>();
        assert_eq!(
            prices,
            vec![Some(190.5), None, None, Some(121.4), Some(880.0), Some(190.5)]
        );
    }
}

#[tokio::test]
async fn duplicate_tickers_are_resolved_independently() {
    // Given: The same ticker twice
    let http = Arc::new(ScriptedHttpClient::new().on("chart/AAPL?", chart_body(json!([190.5]))));
    let fetcher = fetcher(http.clone(), Arc::new(FakeHistory::empty()));

    // When: Both are fetched
    let observations = fetcher
        .fetch_close_prices(&symbols(&["AAPL", "AAPL"]))
        .await
        .expect("valid batch");

    // Then: Two observations, two upstream requests
    assert_eq!(observations.len(), 2);
    assert!(observations.iter().all(|o| o.is_ok()));
    assert_eq!(http.requests_matching("chart/AAPL?"), 2);
}

#[tokio::test]
async fn empty_batch_is_rejected_as_invalid_input() {
    let http = Arc::new(ScriptedHttpClient::new());
    let fetcher = fetcher(http.clone(), Arc::new(FakeHistory::empty()));

    let error = fetcher
        .fetch_close_prices(&[])
        .await
        .expect_err("empty batch must fail");

    assert_eq!(error, ValidationError::EmptySymbolList);
    assert!(http.requests().is_empty());
}

// =============================================================================
// Backward scan and fallback
// =============================================================================

#[tokio::test]
async fn trailing_nulls_resolve_to_last_real_close() {
    // Given: A series whose most recent points are gaps
    let http = Arc::new(
        ScriptedHttpClient::new().on("chart/AAPL?", chart_body(json!([101.2, null, null]))),
    );
    let history = Arc::new(FakeHistory::empty().with("AAPL", Ok(999.0)));
    let fetcher = fetcher(http, history.clone());

    // When: The price is fetched
    let observations = fetcher
        .fetch_close_prices(&symbols(&["AAPL"]))
        .await
        .expect("valid batch");

    // Then: The scan finds 101.2 and the fallback is never consulted
    assert_eq!(observations[0].close_price(), Some(101.2));
    assert_eq!(observations[0].source(), Some(ProviderId::YahooChart));
    assert!(history.calls().is_empty());
}

#[tokio::test]
async fn all_null_series_is_unavailable_only_after_both_sources() {
    // Given: A chart full of gaps and a history source with nothing either
    let http = Arc::new(
        ScriptedHttpClient::new().on("chart/2330.TW?", chart_body(json!([null, null, null]))),
    );
    let history = Arc::new(FakeHistory::empty());
    let fetcher = fetcher(http.clone(), history.clone());

    // When: The price is fetched
    let observations = fetcher
        .fetch_close_prices(&symbols(&["2330.TW"]))
        .await
        .expect("valid batch");

    // Then: Each source was asked exactly once before giving up
    assert_eq!(observations[0].status(), ObservationStatus::Unavailable);
    assert_eq!(
        observations[0].reason(),
        Some(UnavailableReason::NoUsableData)
    );
    assert_eq!(http.requests_matching("chart/2330.TW?"), 1);
    assert_eq!(history.calls(), vec!["2330.TW"]);
}

#[tokio::test]
async fn empty_series_falls_back_to_history() {
    // Given: An empty close array but a usable history entry
    let http = Arc::new(ScriptedHttpClient::new().on("chart/META?", chart_body(json!([]))));
    let history = Arc::new(FakeHistory::empty().with("META", Ok(505.75)));
    let fetcher = fetcher(http, history.clone());

    // When: The price is fetched
    let observations = fetcher
        .fetch_close_prices(&symbols(&["META"]))
        .await
        .expect("valid batch");

    // Then: The history close is used and attributed
    assert_eq!(observations[0].close_price(), Some(505.75));
    assert_eq!(observations[0].source(), Some(ProviderId::YahooHistory));
    assert_eq!(history.calls(), vec!["META"]);
}

#[tokio::test]
async fn malformed_chart_body_triggers_single_fallback() {
    // Given: The chart edge returns an HTML error page with a 200
    let http = Arc::new(ScriptedHttpClient::new().on("chart/AMZN?", "<html>busy</html>"));
    let history = Arc::new(
        FakeHistory::empty().with("AMZN", Err(SourceError::unavailable("history down"))),
    );
    let fetcher = fetcher(http.clone(), history.clone());

    // When: The price is fetched
    let observations = fetcher
        .fetch_close_prices(&symbols(&["AMZN"]))
        .await
        .expect("valid batch");

    // Then: No retries beyond the one fallback, and the failure is typed
    assert_eq!(
        observations[0].reason(),
        Some(UnavailableReason::FetchFailed)
    );
    assert_eq!(http.requests_matching("chart/AMZN?"), 1);
    assert_eq!(history.calls().len(), 1);
}

#[tokio::test]
async fn chart_requests_carry_window_and_timeout() {
    // Given: A fetcher configured with a short timeout and 5-day window
    let http = Arc::new(ScriptedHttpClient::new().on("chart/AAPL?", chart_body(json!([1.0]))));
    let chart = tickwatch_core::YahooChartAdapter::new(http.clone())
        .with_base_url(tickwatch_tests::CHART_BASE)
        .with_timeout_ms(1_500);
    let fetcher =
        tickwatch_core::PriceFetcher::new(Arc::new(chart), Arc::new(FakeHistory::empty()))
            .with_lookback_days(5);

    // When: A price is fetched
    fetcher
        .fetch_close_prices(&symbols(&["AAPL"]))
        .await
        .expect("valid batch");

    // Then: The request spans five days of daily bars and honors the timeout
    let requests = http.requests();
    let request = &requests[0];
    assert_eq!(request.timeout_ms, 1_500);
    assert!(request.url.contains("interval=1d"));
    assert!(request.url.contains("includePrePost=true"));
    assert!(request.url.contains("events=div%2Csplit"));

    let period = |name: &str| -> i64 {
        request
            .url
            .split(['?', '&'])
            .find_map(|pair| pair.strip_prefix(name))
            .and_then(|value| value.parse().ok())
            .expect("period present")
    };
    assert_eq!(period("period2=") - period("period1="), 5 * 86_400);
}
