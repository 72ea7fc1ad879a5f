use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tickwatch_core::{StocksQuery, StocksResponse};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::{ApiResult, ErrorBody};
use crate::main_lib::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /api/stocks?action=search&q=..` or `?action=prices&symbols=a,b`.
async fn stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StocksQuery>,
) -> ApiResult<Json<StocksResponse>> {
    let response = state.gateway.handle(&query).await?;
    Ok(Json(response))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::server_error())).into_response()
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(CorsAny)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };
    cors.allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(CorsAny)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new().route("/stocks", get(stocks));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(config))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tickwatch_core::{
        LocalNameTable, PriceFetcher, PriceSource, PriceWindow, ProviderId, SearchCandidate,
        SearchResolver, SearchSource, SourceError, StocksGateway, TickerSymbol,
    };
    use tower::ServiceExt;

    use super::*;

    struct FixedPrices(HashMap<&'static str, f64>);

    impl PriceSource for FixedPrices {
        fn id(&self) -> ProviderId {
            ProviderId::YahooChart
        }

        fn latest_close<'a>(
            &'a self,
            symbol: &'a TickerSymbol,
            _window: PriceWindow,
        ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
            let answer = self
                .0
                .get(symbol.as_str())
                .copied()
                .ok_or_else(|| SourceError::no_usable_data("no closes in window"));
            Box::pin(async move { answer })
        }
    }

    struct PanickingPrices;

    impl PriceSource for PanickingPrices {
        fn id(&self) -> ProviderId {
            ProviderId::YahooHistory
        }

        fn latest_close<'a>(
            &'a self,
            _symbol: &'a TickerSymbol,
            _window: PriceWindow,
        ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
            Box::pin(async { panic!("history source exploded") })
        }
    }

    struct StalledPrices;

    impl PriceSource for StalledPrices {
        fn id(&self) -> ProviderId {
            ProviderId::YahooChart
        }

        fn latest_close<'a>(
            &'a self,
            _symbol: &'a TickerSymbol,
            _window: PriceWindow,
        ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(SourceError::unavailable("stalled"))
            })
        }
    }

    struct EmptySearch;

    impl SearchSource for EmptySearch {
        fn id(&self) -> ProviderId {
            ProviderId::YahooSearch
        }

        fn search<'a>(
            &'a self,
            _term: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SourceError>> + Send + 'a>>
        {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn router_with(fallback: Arc<dyn PriceSource>) -> Router {
        let primary = FixedPrices(HashMap::from([("AAPL", 190.5)]));
        router_for(PriceFetcher::new(Arc::new(primary), fallback))
    }

    fn router_for(fetcher: PriceFetcher) -> Router {
        let table = LocalNameTable::embedded().expect("embedded table");
        let resolver = SearchResolver::new(Arc::new(EmptySearch), Arc::new(table));
        let state = Arc::new(AppState {
            gateway: StocksGateway::new(fetcher, resolver),
        });
        let config = Config::from_lookup(|_| None).expect("default config");
        app_router(state, &config)
    }

    fn router() -> Router {
        router_with(Arc::new(FixedPrices(HashMap::new())))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    #[tokio::test]
    async fn prices_return_one_entry_per_symbol() {
        let (status, body) = get_json(router(), "/api/stocks?action=prices&symbols=AAPL,ZZZZ").await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().expect("array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["ticker"], "AAPL");
        assert_eq!(entries[0]["close_price"], 190.5);
        assert_eq!(entries[1]["ticker"], "ZZZZ");
        assert_eq!(entries[1]["error"], "no price data available");
    }

    #[tokio::test]
    async fn stalled_upstreams_still_answer_every_symbol() {
        let fetcher = PriceFetcher::new(Arc::new(StalledPrices), Arc::new(StalledPrices))
            .with_max_in_flight(4)
            .with_ticker_deadline_ms(50);

        let (status, body) = get_json(
            router_for(fetcher),
            "/api/stocks?action=prices&symbols=A,B,C,D,E,F,G,H",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().expect("array");
        assert_eq!(entries.len(), 8);
        for (entry, ticker) in entries.iter().zip(["A", "B", "C", "D", "E", "F", "G", "H"]) {
            assert_eq!(entry["ticker"], ticker);
            assert_eq!(entry["error"], "failed to fetch price");
        }
    }

    #[tokio::test]
    async fn search_falls_back_to_local_table() {
        let (status, body) = get_json(
            router(),
            "/api/stocks?action=search&q=%E5%8F%B0%E7%A9%8D%E9%9B%BB",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"ticker": "2330.TW", "name": "台積電", "exchange": "TWSE", "type": "stock"}])
        );
    }

    #[tokio::test]
    async fn invalid_input_is_400_with_message() {
        let (status, body) = get_json(router(), "/api/stocks?action=delete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid action"}));

        let (status, body) = get_json(router(), "/api/stocks?action=search&q=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("message").contains("'q'"));

        let (status, body) = get_json(router(), "/api/stocks?action=prices").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("message").contains("'symbols'"));
    }

    #[tokio::test]
    async fn panic_becomes_generic_500() {
        let router = router_with(Arc::new(PanickingPrices));

        let (status, body) = get_json(router, "/api/stocks?action=prices&symbols=ZZZZ").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "server error"}));
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/stocks")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn healthz_is_plain_ok() {
        let response = router()
            .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&bytes[..], b"ok");
    }
}
