use std::ops::Range;

use chrono::{DateTime, FixedOffset};

use super::dates::{parse_item_date, DateBound};
use super::state::SelectionState;
use crate::feed::NormalizedItem;

/// Filters the normalized items down to the selection window.
///
/// The result is always a subsequence of `items` in feed order. Date bounds
/// compare against the item's full timestamp, so an item published after
/// midnight on the end date falls outside an inclusive end bound.
pub fn select(items: Vec<NormalizedItem>, state: &SelectionState) -> Vec<NormalizedItem> {
    let total = items.len();
    let pages = state
        .paging
        .window()
        .map(|(page, page_size)| page_range(page, page_size, total));

    items
        .into_iter()
        .enumerate()
        .filter(|(index, item)| {
            if state.is_date_mode() {
                let date = item.date.as_deref().and_then(parse_item_date);
                within_bounds(date.as_ref(), state.start_date, state.end_date)
            } else if let Some(range) = &pages {
                range.contains(&(*index as i64))
            } else {
                true
            }
        })
        .map(|(_, item)| item)
        .collect()
}

/// Index range kept for `page` of `page_size` over `total` items:
/// `[max(page-1, 0) * page_size, min(start + page_size, total))`.
///
/// A negative page size yields an empty range.
pub fn page_range(page: i64, page_size: i64, total: usize) -> Range<i64> {
    let total = i64::try_from(total).unwrap_or(i64::MAX);
    let start = page.saturating_sub(1).max(0).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Inclusive bound check. Any comparison involving an invalid or missing
/// date is false, so such items are never excluded.
fn within_bounds(
    date: Option<&DateTime<FixedOffset>>,
    start: Option<DateBound>,
    end: Option<DateBound>,
) -> bool {
    let before_start = start
        .as_ref()
        .and_then(DateBound::instant)
        .zip(date)
        .is_some_and(|(bound, date)| date < bound);
    let after_end = end
        .as_ref()
        .and_then(DateBound::instant)
        .zip(date)
        .is_some_and(|(bound, date)| date > bound);

    !before_start && !after_end
}
