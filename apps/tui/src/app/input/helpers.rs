use crate::app::state::FilterField;

pub const CHART_TABS: usize = 2;
pub const PAGE_STEP: isize = 5;

/// Next filter in focus order, wrapping from the last back to the first.
pub fn next_field(field: FilterField) -> FilterField {
    FilterField::ALL[(field.index() + 1) % FilterField::ALL.len()]
}

pub fn previous_field(field: FilterField) -> FilterField {
    let len = FilterField::ALL.len();
    FilterField::ALL[(field.index() + len - 1) % len]
}

pub const fn next_chart_tab(index: usize) -> usize {
    (index + 1) % CHART_TABS
}

/// Moves a list selection by `delta` rows, clamped to `0..len`.
pub const fn step_selection(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = index.saturating_add_signed(delta);
    if moved >= len {
        len - 1
    } else {
        moved
    }
}
