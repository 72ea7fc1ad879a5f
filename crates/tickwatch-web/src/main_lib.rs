use std::sync::Arc;

use tickwatch_core::StocksGateway;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub gateway: StocksGateway,
}

pub fn init_tracing() {
    let log_format = std::env::var("TICKWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let gateway = StocksGateway::from_config(&config.core)?;
    tracing::info!(
        chart = %config.core.chart_base_url,
        search = %config.core.search_base_url,
        timeout_ms = config.core.request_timeout_ms,
        max_in_flight = config.core.max_in_flight,
        "stocks gateway ready"
    );
    Ok(Arc::new(AppState { gateway }))
}
