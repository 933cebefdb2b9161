//! Property tests for the selection window engine and normalizer.
//!
//! Generated inputs exercise the laws the host relies on: selection never
//! reorders, pagination keeps exactly the documented index range, and date
//! bounds always win over paging.

use chrono::{TimeZone, Utc};
use feedwindow::feed::{normalize, NormalizedItem, RawEntry};
use feedwindow::selection::{
    configure_selection_in, page_range, select, ContinuationArgs, Paging, SelectionQuery,
    SelectionState,
};
use proptest::prelude::*;

fn items(n: usize) -> Vec<NormalizedItem> {
    (0..n)
        .map(|i| NormalizedItem {
            id: Some(i.to_string()),
            date: Some(format!("2024-01-{:02}T12:00:00.000Z", i % 28 + 1)),
            ..Default::default()
        })
        .collect()
}

fn indices(kept: &[NormalizedItem]) -> Vec<usize> {
    kept.iter()
        .map(|i| i.id.as_deref().unwrap().parse().unwrap())
        .collect()
}

fn opt_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z0-9:/.]{0,12}")
}

proptest! {
    #[test]
    fn prop_pagination_keeps_exact_range(n in 0usize..80, page in -3i64..10, size in 1i64..15) {
        let state = SelectionState {
            paging: Paging::FirstPage { page: Some(page), page_size: Some(size) },
            ..Default::default()
        };
        let kept = indices(&select(items(n), &state));

        let expected: Vec<usize> = if page == 0 {
            (0..n).collect()
        } else {
            let start = (page - 1).max(0) * size;
            let end = (start + size).min(n as i64);
            (start..end).map(|i| i as usize).collect()
        };
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn prop_page_range_is_bounded(n in 0usize..200, page in 1i64..50, size in 1i64..50) {
        let range = page_range(page, size, n);
        prop_assert_eq!(range.start, (page - 1) * size);
        prop_assert!(range.end <= n as i64);
        prop_assert!(range.end - range.start <= size);
    }

    #[test]
    fn prop_selection_preserves_order(
        n in 0usize..60,
        start_day in 1u32..29,
        span in 0u32..10,
    ) {
        let query = SelectionQuery {
            start_date: Some(format!("202401{:02}", start_day)),
            end_date: Some(format!("202401{:02}", (start_day + span).min(28))),
            ..Default::default()
        };
        let state = configure_selection_in(&query, None, &Utc);
        let kept = indices(&select(items(n), &state));

        prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_date_bounds_disable_paging(
        start in proptest::option::of("[0-9]{8}"),
        end in proptest::option::of("[0-9]{8}"),
        page in "[0-9]{1,3}",
        size in "[0-9]{1,3}",
        next in any::<bool>(),
    ) {
        prop_assume!(start.is_some() || end.is_some());

        let query = SelectionQuery {
            start_date: start,
            end_date: end,
            page: Some(page.clone()),
            page_size: Some(size.clone()),
        };
        let args = ContinuationArgs {
            at_agent_action: next.then(|| "nextpage".to_string()),
            page: Some(page),
            page_size: Some(size),
        };
        let state = configure_selection_in(&query, Some(&args), &Utc);

        prop_assert_eq!(state.paging, Paging::None);
        let echo = state.echo();
        prop_assert_eq!(echo.action, None);
        prop_assert_eq!(echo.page, None);
        prop_assert_eq!(echo.page_size, None);
    }

    #[test]
    fn prop_normalize_prefers_primary_sources(
        guid in opt_text(),
        link in opt_text(),
        description in opt_text(),
        content in opt_text(),
        author in opt_text(),
        creator in opt_text(),
    ) {
        let raw = RawEntry {
            guid: guid.clone(),
            link: link.clone(),
            description: description.clone(),
            content: content.clone(),
            author: author.clone(),
            creator: creator.clone(),
            ..Default::default()
        };
        let item = normalize(raw.clone());

        let pick = |a: &Option<String>, b: &Option<String>| {
            a.clone().filter(|s| !s.is_empty()).or_else(|| b.clone().filter(|s| !s.is_empty()))
        };
        prop_assert_eq!(item.id, pick(&guid, &link));
        prop_assert_eq!(item.description, pick(&description, &content));
        prop_assert_eq!(item.author, pick(&author, &creator));
        prop_assert_eq!(item.raw_entry, raw);
    }
}

#[test]
fn test_pub_date_fallback_renders_iso_and_retains_timestamp() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 3).unwrap();
    let item = normalize(RawEntry {
        link: Some("https://example.com/a".into()),
        pub_date: Some(ts),
        ..Default::default()
    });

    assert_eq!(item.id.as_deref(), Some("https://example.com/a"));
    assert_eq!(item.date.as_deref(), Some("2024-01-15T08:05:03.000Z"));
    assert_eq!(item.pub_date, Some(ts));
}

#[test]
fn test_continuation_override_discards_query_values() {
    let query = SelectionQuery {
        page: Some("1".into()),
        page_size: Some("5".into()),
        ..Default::default()
    };
    let args = ContinuationArgs {
        at_agent_action: Some("nextpage".into()),
        page: Some("3".into()),
        page_size: Some("10".into()),
    };

    let state = configure_selection_in(&query, Some(&args), &Utc);
    assert_eq!(
        state.paging,
        Paging::NextPage {
            page: 3,
            page_size: 10
        }
    );

    let kept = indices(&select(items(45), &state));
    assert_eq!(kept, (20..30).collect::<Vec<_>>());
}
