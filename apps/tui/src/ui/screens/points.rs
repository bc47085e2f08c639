use crate::app::App;
use crate::ui::screens::dashboard::shortcuts_line;
use crate::ui::widgets::radar::category_color;
use crate::ui::widgets::tables::{row_style, scroll_offset};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub fn render_points_view(app: &App, f: &mut Frame<'_>) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(area);

    render_search_bar(app, f, chunks[0]);

    let points = app.listed_points();
    if points.is_empty() {
        let block = Block::default()
            .title("Points")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let paragraph = Paragraph::new("No points match the current filters")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, chunks[1]);
    } else {
        let header = Row::new(vec![
            Cell::from("ID"),
            Cell::from("Category"),
            Cell::from("Name"),
            Cell::from("Distance"),
            Cell::from("Sample date"),
            Cell::from("Parameter"),
            Cell::from("Location"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let total_rows = points.len();
        let max_visible_rows = chunks[1].height.saturating_sub(3) as usize;
        let offset = scroll_offset(total_rows, max_visible_rows, app.selected_point_index);
        let center = app.filters.center;

        let rows = points
            .iter()
            .enumerate()
            .skip(offset)
            .take(max_visible_rows)
            .map(|(index, point)| {
                let style = row_style(
                    index == app.selected_point_index,
                    category_color(point.category),
                );
                Row::new(vec![
                    Cell::from(point.id.clone()),
                    Cell::from(point.category.short_label()),
                    Cell::from(point.name.clone()),
                    Cell::from(format!("{:.2} km", point.distance_from(&center))),
                    Cell::from(
                        point
                            .sample_date
                            .map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string()),
                    ),
                    Cell::from(point.parameter.clone().unwrap_or_default()),
                    Cell::from(point.location.clone().unwrap_or_default()),
                ])
                .style(style)
            });

        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(18),
            Constraint::Length(18),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(format!(
                        "Points ({} of {})",
                        app.selected_point_index + 1,
                        total_rows
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .column_spacing(1);

        f.render_widget(table, chunks[1]);
    }

    let keys = [
        ("Esc", "Back"),
        ("/", "Search"),
        ("↑/↓", "Navigate"),
        ("PgUp/PgDn", "Jump 5"),
        ("Home/End", "First/Last"),
        ("Enter", "Detail"),
        ("q", "Quit"),
    ];
    f.render_widget(
        Paragraph::new(shortcuts_line(&keys))
            .block(Block::default().borders(Borders::TOP))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

fn render_search_bar(app: &App, f: &mut Frame<'_>, area: ratatui::layout::Rect) {
    let (border, hint) = if app.search_active {
        (Color::Yellow, "typing, Enter to keep, Esc to clear")
    } else {
        (Color::Gray, "press / to search by name or id")
    };
    let cursor = if app.search_active { "█" } else { "" };
    let line = TextLine::from(vec![
        Span::styled("> ", Style::default().fg(border)),
        Span::styled(
            format!("{}{cursor}", app.search_query),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("   ({hint})"), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .title(" Search ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        ),
        area,
    );
}
