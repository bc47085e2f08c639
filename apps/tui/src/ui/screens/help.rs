use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const KEYS: [(&str, &str); 16] = [
    ("F1 / ?", "Toggle this help"),
    ("Space", "Pause/resume animations"),
    ("Tab / Shift+Tab", "Move between filters"),
    ("←/→", "Change the focused filter"),
    ("Enter", "Type a value for report, dates or location"),
    ("Delete", "Clear the focused filter"),
    ("o", "Switch the radius filter on or off"),
    ("+/-", "Grow or shrink the radius by 5 km"),
    ("</>", "Lower or raise the risk thermometer"),
    ("g", "Generate a report for the current view"),
    ("l", "List the visible points"),
    ("/", "Search the list (points screen)"),
    ("c", "Switch chart"),
    ("r", "Reload from the data source"),
    ("x", "Reset filters"),
    ("q", "Quit"),
];

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });
    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(TextLine::from(Span::styled(
        "Press F1, ? or Esc to close",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(Span::styled(
            "Radar de Riesgo Hídrico",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Monitoring points near a center, narrowed by category, inspection report, sampling dates, location and radius.",
        ),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Keyboard Shortcuts:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    for (key, action) in KEYS {
        lines.push(TextLine::from(vec![
            Span::styled(
                format!("  {key}"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" - {action}")),
        ]));
    }

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "CLI Options:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let help_text = crate::cli::CliArgs::help_text();
    for line in help_text.lines() {
        if line.starts_with("Usage") || line.starts_with("Options") || line.trim().is_empty() {
            continue;
        }
        lines.push(TextLine::from(line.to_string()));
    }

    lines
}
