use chrono::{Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

use super::dates::{parse_compact_date, DateBound};

/// Page served when a continuation request omits `_page`.
pub const DEFAULT_NEXT_PAGE: i64 = 2;
/// Page size used when a continuation request omits `_pageSize`.
pub const DEFAULT_NEXT_PAGE_SIZE: i64 = 20;

/// Tag the host sends in `atAgentAction` to ask for the following page.
pub const NEXT_PAGE_TAG: &str = "nextpage";

/// Selection parameters from the request query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectionQuery {
    #[serde(rename = "startDate", default, deserialize_with = "scalar_as_string")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default, deserialize_with = "scalar_as_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub page: Option<String>,
    #[serde(rename = "pageSize", default, deserialize_with = "scalar_as_string")]
    pub page_size: Option<String>,
}

/// Conversational arguments replayed by the host on a continuation turn.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContinuationArgs {
    #[serde(rename = "atAgentAction", default, deserialize_with = "scalar_as_string")]
    pub at_agent_action: Option<String>,
    #[serde(rename = "_page", default, deserialize_with = "scalar_as_string")]
    pub page: Option<String>,
    #[serde(rename = "_pageSize", default, deserialize_with = "scalar_as_string")]
    pub page_size: Option<String>,
}

impl ContinuationArgs {
    pub fn requests_next_page(&self) -> bool {
        self.at_agent_action.as_deref() == Some(NEXT_PAGE_TAG)
    }
}

/// Pagination phase of the continuation handshake.
///
/// `FirstPage` values come straight from the query and may be unparseable
/// (`None`); `NextPage` values always resolve, falling back to
/// [`DEFAULT_NEXT_PAGE`] and [`DEFAULT_NEXT_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Paging {
    #[default]
    None,
    FirstPage {
        page: Option<i64>,
        page_size: Option<i64>,
    },
    NextPage {
        page: i64,
        page_size: i64,
    },
}

impl Paging {
    /// Wire name echoed back as `_action`.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Paging::None => None,
            Paging::FirstPage { .. } => Some("firstpage"),
            Paging::NextPage { .. } => Some(NEXT_PAGE_TAG),
        }
    }

    pub fn page(&self) -> Option<i64> {
        match *self {
            Paging::None => None,
            Paging::FirstPage { page, .. } => page,
            Paging::NextPage { page, .. } => Some(page),
        }
    }

    pub fn page_size(&self) -> Option<i64> {
        match *self {
            Paging::None => None,
            Paging::FirstPage { page_size, .. } => page_size,
            Paging::NextPage { page_size, .. } => Some(page_size),
        }
    }

    /// `(page, page_size)` when both are usable for slicing. Zero counts as
    /// unset.
    pub fn window(&self) -> Option<(i64, i64)> {
        match (self.page(), self.page_size()) {
            (Some(page), Some(size)) if page != 0 && size != 0 => Some((page, size)),
            _ => None,
        }
    }
}

/// Per-request selection state. Computed once, passed by value, echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub start_date: Option<DateBound>,
    pub end_date: Option<DateBound>,
    pub paging: Paging,
}

/// The fields the host replays on its next turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEcho {
    #[serde(rename = "_startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "_endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "_action")]
    pub action: Option<&'static str>,
    #[serde(rename = "_page")]
    pub page: Option<i64>,
    #[serde(rename = "_pageSize")]
    pub page_size: Option<i64>,
}

impl SelectionState {
    pub fn is_date_mode(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn echo(&self) -> SelectionEcho {
        SelectionEcho {
            start_date: self.start_date.and_then(|b| b.to_iso()),
            end_date: self.end_date.and_then(|b| b.to_iso()),
            action: self.paging.action(),
            page: self.paging.page(),
            page_size: self.paging.page_size(),
        }
    }
}

/// Derives the selection state using the process-local timezone for date
/// bounds.
pub fn configure_selection(
    query: &SelectionQuery,
    args: Option<&ContinuationArgs>,
) -> SelectionState {
    configure_selection_in(query, args, &Local)
}

/// Derives the selection state, interpreting `YYYYMMDD` bounds as midnight
/// in `tz`.
///
/// Date bounds take priority: when either is supplied, paging stays
/// [`Paging::None`] whatever the query says. A continuation tagged
/// [`NEXT_PAGE_TAG`] discards the query's page values entirely.
pub fn configure_selection_in<Tz: TimeZone>(
    query: &SelectionQuery,
    args: Option<&ContinuationArgs>,
    tz: &Tz,
) -> SelectionState {
    let mut state = SelectionState {
        start_date: supplied(&query.start_date).map(|s| parse_compact_date(s, tz)),
        end_date: supplied(&query.end_date).map(|s| parse_compact_date(s, tz)),
        paging: Paging::None,
    };

    if state.is_date_mode() {
        return state;
    }

    let (Some(page), Some(page_size)) = (supplied(&query.page), supplied(&query.page_size)) else {
        return state;
    };

    state.paging = match args.filter(|a| a.requests_next_page()) {
        Some(args) => Paging::NextPage {
            page: nonzero_int(&args.page).unwrap_or(DEFAULT_NEXT_PAGE),
            page_size: nonzero_int(&args.page_size).unwrap_or(DEFAULT_NEXT_PAGE_SIZE),
        },
        None => Paging::FirstPage {
            page: parse_int(page),
            page_size: parse_int(page_size),
        },
    };

    state
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn nonzero_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(parse_int).filter(|n| *n != 0)
}

/// Lenient integer parse: leading whitespace, optional sign, then the
/// leading run of decimal digits (`"12abc"` is 12). No digits yields `None`.
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Accepts JSON strings, numbers and booleans as their string form.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| match s {
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
        Scalar::Flag(b) => b.to_string(),
    }))
}
