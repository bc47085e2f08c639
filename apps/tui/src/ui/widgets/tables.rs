use ratatui::style::{Color, Modifier, Style};

pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

pub fn row_style(selected: bool, color: Color) -> Style {
    if selected {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_in_view() {
        assert_eq!(scroll_offset(5, 10, 4), 0);
        assert_eq!(scroll_offset(30, 10, 3), 0);
        assert_eq!(scroll_offset(30, 10, 10), 1);
        assert_eq!(scroll_offset(30, 10, 29), 20);
    }
}
