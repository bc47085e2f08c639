use crate::app::App;
use crate::domain::{Category, MonitoringPoint};
use crate::filter::FilterSummary;
use crate::ui::widgets::radar::category_color;
use chrono::NaiveDate;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs,
};
use ratatui::Frame;
use std::collections::BTreeMap;

pub const CHART_TITLES: [&str; 2] = ["Categories", "Timeline"];

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = CHART_TITLES
        .iter()
        .map(|title| TextLine::from(*title))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

pub fn render_chart_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_chart_tabs(app, f, split[0]);
    if app.chart_tab_index == 0 {
        render_category_barchart(&app.summary(), f, split[1]);
    } else {
        render_sample_timeline(&app.visible_points(), f, split[1]);
    }
}

fn empty_panel(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

pub fn render_category_barchart(summary: &FilterSummary, f: &mut Frame<'_>, area: Rect) {
    if summary.total == 0 {
        empty_panel(f, area, "Points by category", "No points to chart");
        return;
    }

    let counts: Vec<u64> = Category::ALL
        .iter()
        .map(|c| summary.count(*c) as u64)
        .collect();

    let bars: Vec<Bar<'_>> = Category::ALL
        .iter()
        .zip(&counts)
        .map(|(category, value)| {
            Bar::default()
                .value(*value)
                .label(TextLine::from(category.short_label()))
                .style(Style::default().fg(category_color(*category)))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = counts.iter().copied().max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Points by category")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(7);

    f.render_widget(chart, area);
}

/// Number of samples taken on each date, keyed by days since the first one.
pub fn samples_per_date(points: &[&MonitoringPoint]) -> Option<(NaiveDate, Vec<(f64, f64)>)> {
    let mut per_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for date in points.iter().filter_map(|p| p.sample_date) {
        *per_date.entry(date).or_insert(0) += 1;
    }
    let first = *per_date.keys().next()?;
    let series = per_date
        .into_iter()
        .map(|(date, count)| {
            let days = (date - first).num_days();
            (days as f64, f64::from(count))
        })
        .collect();
    Some((first, series))
}

pub fn render_sample_timeline(points: &[&MonitoringPoint], f: &mut Frame<'_>, area: Rect) {
    let Some((first, series)) = samples_per_date(points) else {
        empty_panel(f, area, "Samples per date", "No dated samples");
        return;
    };

    let last_day = series.last().map_or(0.0, |(x, _)| *x).max(1.0);
    let max_count = series.iter().map(|(_, y)| *y).fold(1.0, f64::max);
    let last = first + chrono::Duration::days(last_day as i64);

    let datasets = vec![Dataset::default()
        .name("samples")
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(category_color(Category::CausalityEvaluation)))
        .data(&series)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("Samples per date")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([-0.5, last_day + 0.5])
                .labels(vec![
                    Span::raw(first.format("%Y-%m-%d").to_string()),
                    Span::raw(last.format("%Y-%m-%d").to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("n")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_count + 1.0])
                .labels(vec![Span::raw("0"), Span::raw(format!("{max_count:.0}"))]),
        );

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CENTER;

    fn sampled(id: &str, date: Option<&str>) -> MonitoringPoint {
        MonitoringPoint::new(id, Category::CausalityEvaluation, DEFAULT_CENTER, id)
            .unwrap()
            .with_sample(Some("R"), None, date.and_then(|d| d.parse().ok()))
    }

    #[test]
    fn samples_are_counted_per_day() {
        let points = [
            sampled("a", Some("2018-02-16")),
            sampled("b", Some("2018-02-20")),
            sampled("c", Some("2018-02-20")),
            sampled("d", None),
        ];
        let refs: Vec<&MonitoringPoint> = points.iter().collect();
        let (first, series) = samples_per_date(&refs).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2018, 2, 16).unwrap());
        assert_eq!(series, vec![(0.0, 1.0), (4.0, 2.0)]);
    }

    #[test]
    fn undated_points_give_no_series() {
        let points = [sampled("d", None)];
        let refs: Vec<&MonitoringPoint> = points.iter().collect();
        assert!(samples_per_date(&refs).is_none());
    }
}
