use crate::risk::RiskThermometer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Gauge};
use ratatui::Frame;

pub fn render_thermometer(thermometer: &RiskThermometer, f: &mut Frame<'_>, area: Rect) {
    let level = thermometer.level();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Risk thermometer (</>) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(
            Style::default()
                .fg(level.color())
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .ratio(thermometer.ratio())
        .label(format!(
            "{}/100 {} ({})",
            thermometer.score(),
            level.label(),
            level.local_label()
        ));
    f.render_widget(gauge, area);
}
