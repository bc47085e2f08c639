use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::widgets::{Clear, Widget};

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Like [`centered_rect`], but never smaller than `min_width` x `min_height`
/// while the area allows it.
pub fn centered_at_least(
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
    area: Rect,
) -> Rect {
    let rect = centered_rect(percent_x, percent_y, area);
    let width = rect.width.max(min_width).min(area.width);
    let height = rect.height.max(min_height).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_terminals_still_fit_the_popup() {
        let area = Rect::new(0, 0, 40, 12);
        let popup = centered_at_least(50, 50, 30, 10, area);
        assert_eq!((popup.width, popup.height), (30, 10));
        assert_eq!((popup.x, popup.y), (5, 1));

        let tiny = Rect::new(0, 0, 20, 5);
        let popup = centered_at_least(50, 50, 30, 10, tiny);
        assert_eq!((popup.width, popup.height), (20, 5));
    }
}
