//! abp - Always Be Proxying
//!
//! Resolves MtG card names and spoiler-page URLs to card images and lays
//! them out on printable proxy sheets.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod input;
pub mod matching;
pub mod models;
pub mod resolve;
pub mod search;
pub mod sheet;

// Re-export commonly used items
pub use cache::DownloadCache;
pub use error::{AbpError, AbpResult};
pub use fetch::Fetcher;
pub use input::parse_cards;
pub use matching::{sequence_ratio, url_best_match, DEFAULT_MATCH_THRESHOLD};
pub use models::{card_to_filename, CardEntry, ResolvedImage};
pub use resolve::{resolve_all, CardResolver};
pub use search::{default_engines, CardSearcher, RoundRobin, SearchEngine};
pub use sheet::{compose_sheets, crop_border, scale_to_fit, ComposedSheet};
