use crate::app::{App, FilterField};
use crate::domain::Category;
use crate::ui::widgets::charts::render_chart_panel;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::radar::{category_color, radar_blips, render_mini_radar};
use crate::ui::widgets::thermometer::render_thermometer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const REPORT_ID_WIDTH: usize = 16;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Title area
            Constraint::Min(12),   // Map and panels
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    render_title_section(app, f, layout[0]);
    render_content_section(app, f, layout[1]);
    render_status_section(app, f, layout[2]);
    render_shortcuts(f, layout[3]);
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Radar de Riesgo Hídrico ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(title_block, area);

    let inner = area.inner(Margin::new(1, 1));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(inner);

    let center = app.filters.center;
    let lines = vec![
        TextLine::from(vec![
            Span::styled(
                "Radar ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "de Riesgo Hídrico",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(vec![
            Span::styled("Center: ", Style::default().fg(Color::Gray)),
            Span::styled(center.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled("  Source: ", Style::default().fg(Color::Gray)),
            Span::styled(app.actions.source_name(), Style::default().fg(Color::Yellow)),
        ]),
        legend_line(),
    ];
    f.render_widget(
        Paragraph::new(Text::from(lines)).alignment(Alignment::Left),
        chunks[0],
    );

    render_mini_radar(f, chunks[1], app.animation_counter, &radar_blips(app));
}

fn legend_line() -> TextLine<'static> {
    let mut spans = Vec::new();
    for category in Category::ALL {
        spans.push(Span::styled("● ", Style::default().fg(category_color(category))));
        spans.push(Span::styled(
            format!("{}  ", category.label()),
            Style::default().fg(Color::Gray),
        ));
    }
    TextLine::from(spans)
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_map(app, f, columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Filters
            Constraint::Length(8), // Stats
            Constraint::Length(3), // Thermometer
            Constraint::Min(6),    // Charts
        ])
        .split(columns[1]);

    render_filter_panel(app, f, side[0]);
    render_stats_panel(app, f, side[1]);
    render_thermometer(&app.thermometer, f, side[2]);
    render_chart_panel(app, f, side[3]);
}

fn render_filter_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Filters ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let lines: Vec<TextLine<'_>> = FilterField::ALL
        .iter()
        .map(|field| filter_line(app, *field))
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn filter_line(app: &App, field: FilterField) -> TextLine<'static> {
    let focused = field == app.focused_field;
    let value = if focused && app.editing {
        let blink = (app.animation_counter * 2.0).sin() > 0.0;
        format!("{}{}", app.edit_buffer, if blink { "█" } else { " " })
    } else {
        filter_value(app, field)
    };

    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let prefix = if focused { ">" } else { " " };

    TextLine::from(vec![
        Span::styled(format!("{prefix} {:<9}", field.label()), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ])
}

fn filter_value(app: &App, field: FilterField) -> String {
    let filters = &app.filters;
    let map = &app.config.map;
    match field {
        FilterField::Category => filters.category.label().to_string(),
        FilterField::Report if !map.enable_report_filter => "disabled".to_string(),
        FilterField::Report => shorten(filters.report.label(), REPORT_ID_WIDTH),
        FilterField::DateFrom | FilterField::DateTo if !map.enable_date_filter => {
            "disabled".to_string()
        }
        FilterField::DateFrom => filters
            .date_range
            .start
            .map_or_else(|| "any".to_string(), |d| d.format("%Y-%m-%d").to_string()),
        FilterField::DateTo => filters
            .date_range
            .end
            .map_or_else(|| "any".to_string(), |d| d.format("%Y-%m-%d").to_string()),
        FilterField::Location => filters.location.clone().unwrap_or_else(|| "any".to_string()),
        FilterField::Radius if !map.show_radius => "hidden".to_string(),
        FilterField::Radius if !filters.radius_enabled => {
            format!("{:.0} km (off)", filters.radius_km)
        }
        FilterField::Radius => format!("{:.0} km", filters.radius_km),
    }
}

fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

fn render_stats_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" In view ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let summary = app.summary();
    let label_style = Style::default().fg(Color::Gray);

    let mut lines = vec![TextLine::from(vec![
        Span::styled("Visible: ", label_style),
        Span::styled(
            summary.total.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            match (summary.nearest_km, summary.farthest_km) {
                (Some(near), Some(far)) => format!("  ({near:.1} to {far:.1} km)"),
                _ => String::new(),
            },
            label_style,
        ),
    ])];

    for category in Category::ALL {
        let in_source = app
            .stats
            .as_ref()
            .map_or_else(String::new, |s| format!(" of {}", s.count(category)));
        lines.push(TextLine::from(vec![
            Span::styled("● ", Style::default().fg(category_color(category))),
            Span::styled(format!("{}: ", category.label()), label_style),
            Span::raw(format!("{}{in_source}", summary.count(category))),
        ]));
    }

    if let Some(updated) = app.stats.as_ref().and_then(|s| s.last_update.as_deref()) {
        lines.push(TextLine::from(Span::styled(
            format!("Updated {updated}"),
            label_style,
        )));
    }

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        Text::from(Span::styled(
            if app.animation_paused {
                "Animation paused"
            } else {
                ""
            },
            Style::default().fg(Color::Gray),
        ))
    } else {
        let lowered = app.status_message.to_lowercase();
        let style = if lowered.contains("error") || lowered.contains("failed") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        Text::from(Span::styled(app.status_message.as_str(), style))
    };

    f.render_widget(
        Paragraph::new(status_text)
            .block(status_block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let keys = [
        ("F1", "Help"),
        ("Tab", "Field"),
        ("←/→", "Adjust"),
        ("Enter", "Edit"),
        ("o", "Radius"),
        ("+/-", "Size"),
        ("g", "Report"),
        ("l", "Points"),
        ("r", "Reload"),
        ("q", "Quit"),
    ];
    f.render_widget(
        Paragraph::new(shortcuts_line(&keys)).alignment(Alignment::Center),
        area,
    );
}

pub fn shortcuts_line(keys: &[(&'static str, &'static str)]) -> TextLine<'static> {
    let mut spans = Vec::new();
    for (index, (key, action)) in keys.iter().enumerate() {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        let separator = if index + 1 == keys.len() { "" } else { " | " };
        spans.push(Span::styled(
            format!(": {action}{separator}"),
            Style::default().fg(Color::Gray),
        ));
    }
    TextLine::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_report_ids_are_shortened() {
        assert_eq!(shorten("All", 16), "All");
        let id = "2BAE47A5CEC153E01BB8B857C88F5EA492259423";
        let short = shorten(id, 16);
        assert_eq!(short.chars().count(), 16);
        assert!(short.ends_with('…'));
    }
}
