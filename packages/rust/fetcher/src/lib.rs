//! Document retrieval and HTML cleaning for URL-based playground tools.
//!
//! [`DocumentFetcher`] makes one guarded GET per call and returns a
//! [`FetchedDocument`] whose text has had page chrome stripped, whitespace
//! collapsed, and length capped. Private and non-HTTP targets are refused,
//! including names that only resolve to a private address.
//!
//! [`FetchedDocument`]: playground_shared::FetchedDocument

mod clean;
mod engine;
mod guard;

pub use engine::DocumentFetcher;
