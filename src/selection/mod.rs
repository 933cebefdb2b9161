//! Selection window engine.
//!
//! Decides which normalized items a request gets back:
//!
//! - **Date mode**: `startDate` / `endDate` (`YYYYMMDD`) bound items by their
//!   timestamp. Either bound being present switches pagination off.
//! - **Page mode**: `page` / `pageSize` slice items by index. A follow-up
//!   request tagged `atAgentAction = "nextpage"` takes its page values from
//!   the conversational arguments instead of the query.
//!
//! The engine is stateless: [`configure_selection`] turns one request into a
//! [`SelectionState`], [`select`] applies it, and [`SelectionState::echo`]
//! produces the values the host replays to ask for the next page.

mod dates;
mod state;
mod window;

pub use dates::{parse_compact_date, parse_item_date, DateBound};
pub use state::{
    configure_selection, configure_selection_in, parse_int, ContinuationArgs, Paging,
    SelectionEcho, SelectionQuery, SelectionState, DEFAULT_NEXT_PAGE, DEFAULT_NEXT_PAGE_SIZE,
    NEXT_PAGE_TAG,
};
pub use window::{page_range, select};
