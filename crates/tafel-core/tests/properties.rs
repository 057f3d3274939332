use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use tafel_core::{
    DatePreset, DateWindow, RangeSelection, SelectionState, month_grid, resolve_preset,
};

fn any_day() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2200, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

fn any_named_preset() -> impl Strategy<Value = DatePreset> {
    prop::sample::select(DatePreset::NAMED.to_vec())
}

proptest! {
    #[test]
    fn resolving_is_idempotent(today in any_day(), preset in any_named_preset()) {
        let first = resolve_preset(preset, today).expect("resolve");
        let second = resolve_preset(preset, today).expect("resolve");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn resolved_windows_are_ordered(today in any_day(), preset in any_named_preset()) {
        let window = resolve_preset(preset, today).expect("resolve");
        prop_assert!(window.start <= window.end);
        if matches!(preset, DatePreset::Today | DatePreset::Yesterday) {
            prop_assert_eq!(window.start, window.end);
        }
        if !matches!(
            preset,
            DatePreset::LastWeek | DatePreset::LastMonth | DatePreset::LastQuarter
                | DatePreset::LastYear | DatePreset::Yesterday
        ) {
            prop_assert_eq!(window.end, today);
        }
    }

    #[test]
    fn grids_are_42_consecutive_days_from_a_monday(year in 1900i32..2200, month0 in 0u32..12) {
        let grid = month_grid(year, month0).expect("grid");
        prop_assert_eq!(grid.len(), 42);
        prop_assert_eq!(grid[0].weekday(), chrono::Weekday::Mon);
        for pair in grid.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1).expect("first");
        prop_assert!(grid.contains(&first));
        prop_assert!(grid.iter().filter(|d| d.month0() == month0 && d.year() == year).count() >= 28);
    }

    #[test]
    fn click_order_does_not_matter(a in any_day(), b in any_day()) {
        let mut forward = RangeSelection::default();
        forward.click(a);
        forward.click(b);
        let mut backward = RangeSelection::default();
        backward.click(b);
        backward.click(a);

        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward.window(), Some(DateWindow::new(a, b)));
    }

    #[test]
    fn third_click_always_starts_over(a in any_day(), b in any_day(), c in any_day()) {
        let mut selection = RangeSelection::default();
        selection.click(a);
        selection.click(b);
        selection.click(c);
        prop_assert_eq!(selection.state(), SelectionState::OneSelected);
        prop_assert_eq!(selection.start(), Some(c));
        prop_assert_eq!(selection.end(), None);
    }
}
