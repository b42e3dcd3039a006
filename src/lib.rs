//! Meridian - multilingual place-name search and reverse geocoding.
//!
//! The crate holds the engine core: an in-memory record store, the
//! bulk-ingestion pipeline that populates it from remote tab-separated
//! dumps, a tiered text search and a great-circle reverse lookup. The HTTP
//! API layer, authentication and the static country seed list live in the
//! embedding application and talk to this crate through typed parameters
//! and results.

pub mod error;
pub mod ingest;
pub mod models;
pub mod search;
pub mod spatial;
pub mod store;

pub use error::{FetchError, ValidationError};
pub use models::{AlternateName, Country, CountrySeed, NameFlags, Place};
pub use search::{search, ResultKind, SearchParams, SearchResponse, SearchResult};
pub use spatial::{reverse, ReverseParams, ReverseResult};
pub use store::{GeoStore, StoreStats};
