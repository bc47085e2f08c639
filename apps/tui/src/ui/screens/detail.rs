use crate::app::App;
use crate::ui::widgets::radar::category_color;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_point_detail(app: &App, f: &mut Frame<'_>) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let (title, color, lines) = if let Some(detail) = &app.detail {
        let label_style = Style::default().fg(Color::Gray);
        let mut lines = vec![
            TextLine::from(vec![
                Span::styled("ID: ", label_style),
                Span::raw(detail.id.clone()),
            ]),
            TextLine::from(vec![
                Span::styled("Category: ", label_style),
                Span::styled(
                    detail.category.label(),
                    Style::default().fg(category_color(detail.category)),
                ),
            ]),
            TextLine::from(vec![
                Span::styled("Coordinates: ", label_style),
                Span::raw(detail.coordinate.to_string()),
            ]),
            TextLine::from(vec![
                Span::styled("Distance: ", label_style),
                Span::raw(format!(
                    "{:.2} km from the center",
                    app.filters.center.distance_km(&detail.coordinate)
                )),
            ]),
            TextLine::from(""),
        ];
        if detail.fields.is_empty() {
            lines.push(TextLine::from(Span::styled(
                "No further information",
                label_style,
            )));
        }
        for (key, value) in &detail.fields {
            lines.push(TextLine::from(vec![
                Span::styled(format!("{key}: "), Style::default().fg(Color::Yellow)),
                Span::raw(value.clone()),
            ]));
        }
        (detail.name.clone(), Color::Cyan, lines)
    } else {
        let message = app
            .detail_error
            .clone()
            .unwrap_or_else(|| "No point selected".to_string());
        (
            "Point detail".to_string(),
            Color::Red,
            vec![TextLine::from(Span::styled(
                message,
                Style::default().fg(Color::Red),
            ))],
        )
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {title} "))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, chunks[0]);

    f.render_widget(
        Paragraph::new("Esc: Back | q: Quit")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        chunks[1],
    );
}
