//! # Domain Models
//!
//! Canonical types exchanged between the fetcher, the resolver and the
//! adapters.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TickerSymbol`] | Opaque ticker key (`AAPL`, `2330.TW`) |
//! | [`SearchCandidate`] | One ticker proposed for a search query |
//! | [`PriceObservation`] | Latest close (or typed unavailability) for one ticker |
//! | [`PriceWindow`] | Trailing window queried for daily closes |
//! | [`PriceChange`] | Delta between two closes, for snapshot diffing |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! `PriceObservation` can only be built through [`PriceObservation::ok`],
//! which rejects non-finite prices, or [`PriceObservation::unavailable`].

mod models;
mod symbol;
mod timestamp;

pub use models::{
    CandidateKind, ObservationStatus, PriceChange, PriceDirection, PriceObservation, PriceWindow,
    SearchCandidate, UnavailableReason, UNKNOWN_EXCHANGE,
};
pub use symbol::TickerSymbol;
pub use timestamp::UtcDateTime;
