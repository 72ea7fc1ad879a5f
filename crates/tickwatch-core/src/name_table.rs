//! Curated local ticker table used when remote search comes back empty.
//!
//! The table is an ordered JSON asset:
//!
//! ```json
//! {
//!   "entries": [
//!     {"key": "台積電", "ticker": "2330.TW", "name": "台積電-台灣積體電路製造股份有限公司", "exchange": "TWSE", "kind": "stock"}
//!   ],
//!   "transliterations": [{"term": "台積電", "alternate": "TSMC"}]
//! }
//! ```
//!
//! Entry order matters: fuzzy lookup returns the first entry that matches.

use std::path::Path;

use serde::Deserialize;

use crate::{
    CandidateKind, CoreError, SearchCandidate, TickerSymbol, ValidationError, UNKNOWN_EXCHANGE,
};

const EMBEDDED_TABLE: &str = include_str!("../data/local_names.json");

/// One curated row of the local table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub key: String,
    pub ticker: TickerSymbol,
    /// Curated full name, `short-long` for Taiwan listings.
    pub name: String,
    pub exchange: String,
    pub kind: CandidateKind,
}

impl NameEntry {
    /// The short name shown on the dashboard (text before the first `-`).
    pub fn display_name(&self) -> &str {
        self.name
            .split('-')
            .next()
            .map(str::trim)
            .filter(|short| !short.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn to_candidate(&self) -> SearchCandidate {
        SearchCandidate::new(
            self.ticker.clone(),
            self.display_name(),
            Some(self.exchange.as_str()),
            self.kind,
        )
    }
}

/// Which lookup rule produced a local match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    ExactKey,
    TickerCode,
    Fuzzy,
}

impl MatchRule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactKey => "exact_key",
            Self::TickerCode => "ticker_code",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// Immutable local name table, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNameTable {
    entries: Vec<NameEntry>,
    transliterations: Vec<(String, String)>,
}

impl LocalNameTable {
    /// The table compiled into the binary.
    pub fn embedded() -> Result<Self, CoreError> {
        Self::from_json_str(EMBEDDED_TABLE)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load an override file when one is configured, else the embedded table.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::embedded(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let file: NameTableFile = serde_json::from_str(raw)?;

        let entries = file
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_entry(index))
            .collect::<Result<Vec<_>, _>>()?;

        let transliterations = file
            .transliterations
            .into_iter()
            .filter_map(|row| {
                let term = row.term.trim().to_owned();
                let alternate = row.alternate.trim().to_owned();
                (!term.is_empty() && !alternate.is_empty()).then_some((term, alternate))
            })
            .collect();

        Ok(Self {
            entries,
            transliterations,
        })
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alternate search term for a localized name, if one is curated.
    pub fn transliterate(&self, term: &str) -> Option<&str> {
        let term = term.trim();
        self.transliterations
            .iter()
            .find(|(source, _)| source == term)
            .map(|(_, alternate)| alternate.as_str())
    }

    /// Find the single best local entry for `query`.
    ///
    /// Rules are tried in order: exact key (case-insensitive), ticker or
    /// ticker code, then fuzzy containment in table order. An entry matches
    /// fuzzily when its full name or ticker contains the query, or when the
    /// query contains its display name.
    pub fn find(&self, query: &str) -> Option<(MatchRule, &NameEntry)> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.key.to_lowercase() == query)
        {
            return Some((MatchRule::ExactKey, entry));
        }

        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| {
                entry.ticker.as_str().to_lowercase() == query
                    || entry.ticker.code().to_lowercase() == query
            })
        {
            return Some((MatchRule::TickerCode, entry));
        }

        self.entries
            .iter()
            .find(|entry| {
                let display = entry.display_name().to_lowercase();
                entry.name.to_lowercase().contains(&query)
                    || entry.ticker.as_str().to_lowercase().contains(&query)
                    || query.contains(&display)
            })
            .map(|entry| (MatchRule::Fuzzy, entry))
    }

    pub fn lookup(&self, query: &str) -> Option<SearchCandidate> {
        self.find(query).map(|(_, entry)| entry.to_candidate())
    }

    /// Display name of the first entry listing `ticker`.
    pub fn name_for_ticker(&self, ticker: &TickerSymbol) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.ticker.as_str().eq_ignore_ascii_case(ticker.as_str()))
            .map(NameEntry::display_name)
    }
}

#[derive(Debug, Deserialize)]
struct NameTableFile {
    #[serde(default)]
    entries: Vec<RawNameEntry>,
    #[serde(default)]
    transliterations: Vec<RawTransliteration>,
}

#[derive(Debug, Deserialize)]
struct RawNameEntry {
    key: Option<String>,
    ticker: Option<String>,
    name: Option<String>,
    exchange: Option<String>,
    #[serde(default)]
    kind: Option<CandidateKind>,
}

impl RawNameEntry {
    fn into_entry(self, index: usize) -> Result<NameEntry, ValidationError> {
        let key = required(self.key, index, "key")?;
        let ticker = TickerSymbol::parse(&required(self.ticker, index, "ticker")?)?;
        let name = required(self.name, index, "name")?;
        let exchange = self
            .exchange
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_EXCHANGE.to_owned());

        Ok(NameEntry {
            key,
            ticker,
            name,
            exchange,
            kind: self.kind.unwrap_or(CandidateKind::Stock),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTransliteration {
    term: String,
    alternate: String,
}

fn required(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, ValidationError> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::IncompleteTableEntry { index, field })
}
