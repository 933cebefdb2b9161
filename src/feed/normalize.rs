use chrono::{DateTime, Utc};
use serde::Serialize;

use super::parser::{to_iso_string, RawEntry};

/// Canonical item shape returned to the host.
///
/// Optional fields are omitted from the serialized form rather than emitted
/// as empty strings or nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Only set when `date` was derived from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub raw_entry: RawEntry,
}

/// Output fields that are filled from one of two raw sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Id,
    Description,
    Date,
    Author,
}

/// Which side of a rule supplied the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Primary,
    Fallback,
}

type Extract = fn(&RawEntry) -> Option<String>;

/// A (primary, fallback) preference for one output field.
pub struct FieldRule {
    pub field: ItemField,
    primary: Extract,
    fallback: Extract,
}

impl FieldRule {
    /// First non-empty source wins; the fallback is never consulted when the
    /// primary is present.
    pub fn resolve(&self, raw: &RawEntry) -> Option<(String, Origin)> {
        non_empty((self.primary)(raw))
            .map(|v| (v, Origin::Primary))
            .or_else(|| non_empty((self.fallback)(raw)).map(|v| (v, Origin::Fallback)))
    }
}

/// Field preference table, evaluated in order.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: ItemField::Id,
        primary: |r| r.guid.clone(),
        fallback: |r| r.link.clone(),
    },
    FieldRule {
        field: ItemField::Description,
        primary: |r| r.description.clone(),
        fallback: |r| r.content.clone(),
    },
    FieldRule {
        field: ItemField::Date,
        primary: |r| r.iso_date.clone(),
        fallback: |r| r.pub_date.as_ref().map(to_iso_string),
    },
    FieldRule {
        field: ItemField::Author,
        primary: |r| r.author.clone(),
        fallback: |r| r.creator.clone(),
    },
];

/// Maps a raw entry onto the canonical item shape.
///
/// Total over any input: missing fields are simply left out.
pub fn normalize(raw: RawEntry) -> NormalizedItem {
    let mut item = NormalizedItem {
        guid: non_empty(raw.guid.clone()),
        title: non_empty(raw.title.clone()),
        link: non_empty(raw.link.clone()),
        ..Default::default()
    };

    for rule in FIELD_RULES {
        let Some((value, origin)) = rule.resolve(&raw) else {
            continue;
        };
        match rule.field {
            ItemField::Id => item.id = Some(value),
            ItemField::Description => item.description = Some(value),
            ItemField::Author => item.author = Some(value),
            ItemField::Date => {
                if origin == Origin::Fallback {
                    item.pub_date = raw.pub_date;
                }
                item.date = Some(value);
            }
        }
    }

    item.raw_entry = raw;
    item
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn rule(field: ItemField) -> &'static FieldRule {
        FIELD_RULES.iter().find(|r| r.field == field).unwrap()
    }

    #[test]
    fn test_id_prefers_guid_over_link() {
        let raw = RawEntry {
            guid: Some("urn:1".into()),
            link: Some("https://example.com/1".into()),
            ..Default::default()
        };
        let item = normalize(raw);
        assert_eq!(item.id.as_deref(), Some("urn:1"));
        assert_eq!(item.guid.as_deref(), Some("urn:1"));
        assert_eq!(item.link.as_deref(), Some("https://example.com/1"));
    }

    #[test]
    fn test_id_falls_back_to_link_without_guid() {
        let raw = RawEntry {
            link: Some("https://example.com/1".into()),
            ..Default::default()
        };
        let item = normalize(raw);
        assert_eq!(item.id.as_deref(), Some("https://example.com/1"));
        assert!(item.guid.is_none());
    }

    #[test]
    fn test_description_falls_back_to_content() {
        let raw = RawEntry {
            content: Some("<p>body</p>".into()),
            ..Default::default()
        };
        assert_eq!(normalize(raw).description.as_deref(), Some("<p>body</p>"));

        let both = RawEntry {
            description: Some("summary".into()),
            content: Some("body".into()),
            ..Default::default()
        };
        assert_eq!(normalize(both).description.as_deref(), Some("summary"));
    }

    #[test]
    fn test_date_from_pub_date_retains_pub_date() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 12).unwrap();
        let raw = RawEntry {
            pub_date: Some(ts),
            ..Default::default()
        };
        let item = normalize(raw);
        assert_eq!(item.date.as_deref(), Some("2024-03-09T17:45:12.000Z"));
        assert_eq!(item.pub_date, Some(ts));
    }

    #[test]
    fn test_iso_date_wins_and_pub_date_is_dropped() {
        let raw = RawEntry {
            iso_date: Some("2024-01-01T00:00:00.000Z".into()),
            pub_date: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let item = normalize(raw);
        assert_eq!(item.date.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert!(item.pub_date.is_none());
    }

    #[test]
    fn test_author_falls_back_to_creator() {
        let raw = RawEntry {
            creator: Some("Grace".into()),
            ..Default::default()
        };
        assert_eq!(normalize(raw).author.as_deref(), Some("Grace"));
    }

    #[test]
    fn test_empty_primary_counts_as_absent() {
        let raw = RawEntry {
            guid: Some(String::new()),
            link: Some("https://example.com/x".into()),
            ..Default::default()
        };
        let item = normalize(raw);
        assert_eq!(item.id.as_deref(), Some("https://example.com/x"));
        assert!(item.guid.is_none());
    }

    #[test]
    fn test_empty_entry_normalizes_to_bare_item() {
        let item = normalize(RawEntry::default());
        let json = serde_json::to_value(&item).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("rawEntry"));
    }

    #[test]
    fn test_rule_resolution_reports_origin() {
        let raw = RawEntry {
            author: Some("Ada".into()),
            creator: Some("Grace".into()),
            ..Default::default()
        };
        assert_eq!(
            rule(ItemField::Author).resolve(&raw),
            Some(("Ada".to_string(), Origin::Primary))
        );
        assert_eq!(rule(ItemField::Description).resolve(&raw), None);

        let only_link = RawEntry {
            link: Some("l".into()),
            ..Default::default()
        };
        assert_eq!(
            rule(ItemField::Id).resolve(&only_link),
            Some(("l".to_string(), Origin::Fallback))
        );
    }

    #[test]
    fn test_raw_entry_is_retained() {
        let raw = RawEntry {
            title: Some("Kept".into()),
            creator: Some("Grace".into()),
            ..Default::default()
        };
        let item = normalize(raw.clone());
        assert_eq!(item.raw_entry, raw);
        assert_eq!(item.title.as_deref(), Some("Kept"));
    }
}
