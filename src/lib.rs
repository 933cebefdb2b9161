//! Feed window connector.
//!
//! Fetches an RSS/Atom feed, normalizes its entries into a stable item
//! schema and returns the slice selected by a date range or a page window.
//!
//! - [`feed`] - transport, parsing and item normalization
//! - [`selection`] - date/page selection and the next-page handshake
//! - [`handler`] - one request/response invocation over the whole pipeline
//! - [`config`] - TOML configuration for the command-line host

pub mod config;
pub mod feed;
pub mod handler;
pub mod selection;
