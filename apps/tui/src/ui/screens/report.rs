use crate::app::App;
use crate::report::{Report, ReportStatus};
use crate::ui::screens::dashboard::render_dashboard;
use crate::ui::widgets::popup::{centered_at_least, ClearWidget};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

/// The report popup floats over the dashboard.
pub fn render_report(app: &App, f: &mut Frame<'_>) {
    render_dashboard(app, f);

    let area = centered_at_least(80, 80, 50, 12, f.area());
    f.render_widget(ClearWidget, area);

    match app.report.status() {
        ReportStatus::Pending => render_pending(app, f, area),
        ReportStatus::Resolved(report) => render_resolved(app, report, f, area),
        ReportStatus::Failed(reason) => render_message(
            f,
            area,
            &format!("Report failed: {reason}"),
            Color::Red,
        ),
        ReportStatus::Idle => render_message(f, area, "No report requested", Color::Gray),
    }
}

fn popup_block(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn render_pending(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = popup_block("Report", Color::Yellow);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let throbber = Throbber::default()
        .label("Generating report...")
        .style(Style::default().fg(Color::White))
        .throbber_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_SIX);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    f.render_widget(
        Paragraph::new(throbber.to_line(&app.throbber)).alignment(Alignment::Center),
        rows[1],
    );
}

fn render_resolved(app: &App, report: &Report, f: &mut Frame<'_>, area: Rect) {
    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("Overall risk: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} ({})", report.risk.label(), report.risk.local_label()),
                Style::default()
                    .fg(report.risk.color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "   {} samples, generated {}",
                    report.sample_count,
                    report.generated_at.format("%Y-%m-%d %H:%M UTC")
                ),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ];

    for section in &report.sections {
        lines.push(TextLine::from(""));
        lines.push(TextLine::from(Span::styled(
            section.heading.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for line in &section.lines {
            lines.push(TextLine::from(format!("  {line}")));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(popup_block(&report.title, Color::Cyan).title_bottom(" ↑/↓ scroll | Esc close "))
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_message(f: &mut Frame<'_>, area: Rect, message: &str, color: Color) {
    f.render_widget(
        Paragraph::new(message.to_string())
            .block(popup_block("Report", color).title_bottom(" Esc close "))
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
