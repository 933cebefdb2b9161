//! Feed retrieval and normalization.
//!
//! - [`fetcher`] - HTTP retrieval with proxy support, timeouts and size limits
//! - [`parser`] - RSS/Atom parsing into [`RawEntry`] values using `feed-rs`
//! - [`normalize`] - mapping raw entries onto the canonical [`NormalizedItem`]

mod fetcher;
mod normalize;
mod parser;

pub use fetcher::{build_client, fetch_feed, FetchError, FetchSettings};
pub use normalize::{normalize, FieldRule, ItemField, NormalizedItem, Origin, FIELD_RULES};
pub use parser::{parse_feed, to_iso_string, RawEntry};
