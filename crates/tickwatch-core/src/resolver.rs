//! Free-text ticker search.
//!
//! Remote search runs for the raw query and, when the local table knows a
//! transliteration, for the alternate term as well. Results are unioned in
//! that order with duplicate tickers dropped. Only when the remote path
//! yields nothing at all does the local table answer, with at most one
//! candidate.

use std::collections::HashSet;
use std::sync::Arc;

use crate::data_source::SearchSource;
use crate::name_table::LocalNameTable;
use crate::{SearchCandidate, ValidationError};

#[derive(Clone)]
pub struct SearchResolver {
    remote: Arc<dyn SearchSource>,
    table: Arc<LocalNameTable>,
}

impl SearchResolver {
    pub fn new(remote: Arc<dyn SearchSource>, table: Arc<LocalNameTable>) -> Self {
        Self { remote, table }
    }

    pub fn table(&self) -> &LocalNameTable {
        &self.table
    }

    /// Candidates for `query`. Upstream failures never surface as errors.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let mut terms = vec![query];
        if let Some(alternate) = self.table.transliterate(query) {
            if alternate != query {
                terms.push(alternate);
            }
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for term in terms {
            match self.remote.search(term).await {
                Ok(hits) => {
                    tracing::debug!(term, hits = hits.len(), "remote search answered");
                    candidates.extend(
                        hits.into_iter()
                            .filter(|candidate| seen.insert(candidate.ticker.clone())),
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        term,
                        source = %self.remote.id(),
                        code = error.code(),
                        error = error.message(),
                        "remote search failed"
                    );
                }
            }
        }

        if !candidates.is_empty() {
            tracing::info!(query, results = candidates.len(), "search resolved remotely");
            return Ok(candidates);
        }

        match self.table.find(query) {
            Some((rule, entry)) => {
                tracing::info!(
                    query,
                    rule = rule.as_str(),
                    ticker = %entry.ticker,
                    "search resolved from local table"
                );
                Ok(vec![entry.to_candidate()])
            }
            None => {
                tracing::info!(query, "search found no candidates");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceError;
    use crate::{CandidateKind, ProviderId, TickerSymbol};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct CannedSearch {
        answers: Vec<(&'static str, Result<Vec<SearchCandidate>, SourceError>)>,
        terms: Mutex<Vec<String>>,
    }

    impl CannedSearch {
        fn new(answers: Vec<(&'static str, Result<Vec<SearchCandidate>, SourceError>)>) -> Arc<Self> {
            Arc::new(Self {
                answers,
                terms: Mutex::new(Vec::new()),
            })
        }

        fn terms(&self) -> Vec<String> {
            self.terms.lock().expect("terms lock").clone()
        }
    }

    impl SearchSource for CannedSearch {
        fn id(&self) -> ProviderId {
            ProviderId::YahooSearch
        }

        fn search<'a>(
            &'a self,
            term: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SourceError>> + Send + 'a>>
        {
            self.terms.lock().expect("terms lock").push(term.to_owned());
            let answer = self
                .answers
                .iter()
                .find(|(known, _)| *known == term)
                .map(|(_, answer)| answer.clone())
                .unwrap_or_else(|| Ok(Vec::new()));
            Box::pin(async move { answer })
        }
    }

    fn candidate(ticker: &str, name: &str) -> SearchCandidate {
        SearchCandidate::new(
            TickerSymbol::parse(ticker).expect("valid symbol"),
            name,
            Some("NMS"),
            CandidateKind::Stock,
        )
    }

    fn table() -> Arc<LocalNameTable> {
        Arc::new(LocalNameTable::embedded().expect("embedded table"))
    }

    #[tokio::test]
    async fn blank_query_is_invalid_input() {
        let resolver = SearchResolver::new(CannedSearch::new(Vec::new()), table());
        let err = resolver.search("  ").await.expect_err("blank must fail");
        assert_eq!(err, ValidationError::EmptyQuery);
    }

    #[tokio::test]
    async fn transliterated_term_results_are_unioned_without_duplicates() {
        let remote = CannedSearch::new(vec![
            ("台積電", Ok(vec![candidate("2330.TW", "TSMC")])),
            (
                "TSMC",
                Ok(vec![candidate("TSM", "Taiwan Semiconductor"), candidate("2330.TW", "TSMC")]),
            ),
        ]);
        let resolver = SearchResolver::new(remote.clone(), table());

        let results = resolver.search("台積電").await.expect("search succeeds");
        let tickers = results
            .iter()
            .map(|c| c.ticker.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tickers, vec!["2330.TW", "TSM"]);
        assert_eq!(remote.terms(), vec!["台積電", "TSMC"]);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local_table() {
        let remote = CannedSearch::new(vec![(
            "鴻海",
            Err(SourceError::unavailable("yahoo search timed out")),
        )]);
        let resolver = SearchResolver::new(remote, table());

        let results = resolver.search("鴻海").await.expect("never errors");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker.as_str(), "2317.TW");
        assert_eq!(results[0].display_name, "鴻海");
        assert_eq!(results[0].exchange, "TWSE");
    }

    #[tokio::test]
    async fn nothing_anywhere_is_empty_not_error() {
        let resolver = SearchResolver::new(CannedSearch::new(Vec::new()), table());
        let results = resolver
            .search("qqqq no such instrument")
            .await
            .expect("never errors");
        assert!(results.is_empty());
    }
}
