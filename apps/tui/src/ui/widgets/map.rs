use crate::app::{App, LoadState};
use crate::domain::Category;
use crate::geo::circle_polygon;
use crate::map::{fit_view, MarkerPopup, ViewBounds};
use crate::ui::widgets::popup::ClearWidget;
use crate::ui::widgets::radar::category_color;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const CIRCLE_SEGMENTS: usize = 72;

pub fn render_map(app: &App, f: &mut Frame<'_>, area: Rect) {
    let visible = app.visible_points();
    let revealed = app.revealed_points();
    let center = app.filters.center;
    let radius_shown = app.radius_applied();
    let view = fit_view(&visible, &center, app.filters.radius_km, radius_shown);

    let title = if app.batcher.is_complete() {
        format!(" Map ({} points) ", visible.len())
    } else {
        format!(
            " Map ({}/{} revealed) ",
            app.batcher.revealed(),
            app.batcher.total()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);

    let circle = if radius_shown {
        circle_polygon(&center, app.filters.radius_km, CIRCLE_SEGMENTS)
    } else {
        Vec::new()
    };
    let selected = app.selected_point();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(view.x_bounds())
        .y_bounds(view.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for edge in circle.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: edge[0].lng,
                    y1: edge[0].lat,
                    x2: edge[1].lng,
                    y2: edge[1].lat,
                    color: Color::Cyan,
                });
            }

            for category in Category::ALL {
                let coords: Vec<(f64, f64)> = revealed
                    .iter()
                    .filter(|p| p.category == category)
                    .map(|p| (p.longitude, p.latitude))
                    .collect();
                if !coords.is_empty() {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: category_color(category),
                    });
                }
            }

            draw_center_cross(ctx, &view, center.lng, center.lat);

            if let Some(point) = selected {
                ctx.draw(&Circle {
                    x: point.longitude,
                    y: point.latitude,
                    radius: (view.max_lng - view.min_lng) * 0.015,
                    color: Color::Yellow,
                });
            }
        });
    f.render_widget(canvas, area);

    if let LoadState::Failed(message) = &app.load_state {
        render_banner(f, inner, message, Color::Red);
    } else if app.load_state == LoadState::Loading {
        render_banner(f, inner, "Loading points...", Color::Yellow);
    } else if visible.is_empty() && app.load_state == LoadState::Ready {
        render_banner(f, inner, "No points match the current filters", Color::Gray);
    }

    if let Some(point) = selected {
        let popup = MarkerPopup::for_point(point, &center, radius_shown);
        render_marker_popup(f, inner, &popup);
    }
}

fn draw_center_cross(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    view: &ViewBounds,
    x: f64,
    y: f64,
) {
    let dx = (view.max_lng - view.min_lng) * 0.02;
    let dy = (view.max_lat - view.min_lat) * 0.02;
    ctx.draw(&CanvasLine {
        x1: x - dx,
        y1: y,
        x2: x + dx,
        y2: y,
        color: Color::White,
    });
    ctx.draw(&CanvasLine {
        x1: x,
        y1: y - dy,
        x2: x,
        y2: y + dy,
        color: Color::White,
    });
}

fn render_banner(f: &mut Frame<'_>, area: Rect, message: &str, color: Color) {
    if area.height == 0 {
        return;
    }
    let banner = Rect {
        height: 1,
        ..area
    };
    f.render_widget(ClearWidget, banner);
    f.render_widget(
        Paragraph::new(message.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        banner,
    );
}

/// Popup in the lower right corner of the map.
fn render_marker_popup(f: &mut Frame<'_>, area: Rect, popup: &MarkerPopup) {
    let width = area.width.min(44);
    let rows = u16::try_from(popup.rows.len()).unwrap_or(u16::MAX);
    let height = rows.saturating_add(2).min(area.height);
    if width < 12 || height < 3 {
        return;
    }
    let popup_area = Rect {
        x: area.x + area.width - width,
        y: area.y + area.height - height,
        width,
        height,
    };

    let lines: Vec<TextLine<'_>> = popup
        .rows
        .iter()
        .map(|(label, value)| {
            TextLine::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
                Span::styled(value.as_str(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    f.render_widget(ClearWidget, popup_area);
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title(format!(" {} ", popup.title))
                    .title_style(Style::default().fg(Color::Yellow))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}
