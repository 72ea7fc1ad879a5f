use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifiers for the upstreams a result can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Yahoo `v8/finance/chart` time series.
    YahooChart,
    /// Quote history through the `yahoo_finance_api` library.
    YahooHistory,
    /// Yahoo `v1/finance/search` full-text lookup.
    YahooSearch,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YahooChart => "yahoo_chart",
            Self::YahooHistory => "yahoo_history",
            Self::YahooSearch => "yahoo_search",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
