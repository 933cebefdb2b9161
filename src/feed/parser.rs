use chrono::{DateTime, SecondsFormat, Utc};
use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};
use serde::{Deserialize, Serialize};

/// One feed entry as the parser sees it, before normalization.
///
/// Every field is optional: RSS and Atom documents populate different
/// subsets, and nothing here is defaulted. Serialized with the camelCase
/// names downstream consumers expect (`isoDate`, `pubDate`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Publication time, already rendered as ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_date: Option<String>,
    /// Last-updated timestamp, kept as a typed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

/// Renders a timestamp the way feed consumers expect: UTC, millisecond
/// precision, `Z` suffix (`2024-01-05T10:00:00.000Z`).
pub fn to_iso_string(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RSS/Atom document into raw entries, preserving document order.
///
/// Entries without an id in the source document get no `guid`: the parser's
/// synthetic id generation is disabled so that the normalizer can fall back
/// to the entry link.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>, ParseFeedError> {
    let feed = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build()
        .parse(bytes)?;

    Ok(feed.entries.into_iter().map(raw_entry_from).collect())
}

fn raw_entry_from(entry: Entry) -> RawEntry {
    RawEntry {
        guid: present(entry.id),
        link: entry.links.into_iter().next().and_then(|l| present(l.href)),
        title: entry.title.and_then(|t| present(t.content)),
        description: entry.summary.and_then(|s| present(s.content)),
        content: entry.content.and_then(|c| c.body).and_then(present),
        iso_date: entry.published.as_ref().map(to_iso_string),
        pub_date: entry.updated,
        author: entry.authors.into_iter().next().and_then(|p| present(p.name)),
        creator: entry
            .contributors
            .into_iter()
            .next()
            .and_then(|p| present(p.name)),
    }
}

/// Strips control characters and drops values that are blank afterwards.
fn present(value: String) -> Option<String> {
    let needs_strip = value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'));

    let cleaned = if needs_strip {
        value
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
            .collect()
    } else {
        value
    };

    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
