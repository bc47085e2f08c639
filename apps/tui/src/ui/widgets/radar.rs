use crate::app::App;
use crate::domain::Category;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::Frame;

pub const fn category_color(category: Category) -> Color {
    match category {
        Category::CausalityEvaluation => Color::Rgb(220, 38, 38),
        Category::Education => Color::Rgb(5, 150, 105),
        Category::Health => Color::Rgb(37, 99, 235),
        Category::Population => Color::Rgb(124, 58, 237),
    }
}

/// A point placed on the radar: compass bearing in degrees and distance as a
/// fraction of the outer ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarBlip {
    pub bearing_deg: f64,
    pub fraction: f64,
    pub color: Color,
}

/// Blips for the visible points. The outer ring is the search radius, or the
/// farthest point when the radius is off.
pub fn radar_blips(app: &App) -> Vec<RadarBlip> {
    let center = app.filters.center;
    let visible = app.visible_points();
    let distances: Vec<f64> = visible.iter().map(|p| p.distance_from(&center)).collect();

    let scale = if app.radius_applied() {
        app.filters.radius_km
    } else {
        distances.iter().copied().fold(0.0, f64::max)
    };
    if scale <= 0.0 {
        return Vec::new();
    }

    visible
        .iter()
        .zip(distances)
        .map(|(point, distance)| RadarBlip {
            bearing_deg: center.bearing_to(&point.coordinate()),
            fraction: (distance / scale).min(1.0),
            color: category_color(point.category),
        })
        .collect()
}

/// Sweep trail length, in radians behind the beam.
const TRAIL: f64 = std::f64::consts::FRAC_PI_4;
const TRAIL_STEPS: u32 = 6;

fn polar(origin: (f64, f64), distance: f64, theta: f64) -> (f64, f64) {
    (
        theta.cos().mul_add(distance, origin.0),
        theta.sin().mul_add(distance, origin.1),
    )
}

/// Angular distance the beam has travelled past `theta`, in [0, 2π).
fn behind_beam(beam: f64, theta: f64) -> f64 {
    (beam - theta).rem_euclid(std::f64::consts::TAU)
}

/// Range rings at thirds of the radius, a north tick, a counter-clockwise
/// sweep with a short trail, and the blips. Blips the beam just crossed are
/// drawn brighter.
pub fn render_mini_radar(f: &mut Frame<'_>, area: Rect, animation: f64, blips: &[RadarBlip]) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let side = area.width.min(area.height);
    let square = Rect::new(
        area.x + (area.width - side) / 2,
        area.y + (area.height - side) / 2,
        side,
        side,
    );
    let extent = f64::from(side);

    let canvas = Canvas::default()
        .x_bounds([0.0, extent])
        .y_bounds([0.0, extent])
        .paint(move |ctx| {
            let origin = (extent / 2.0, extent / 2.0);
            let radius = extent * 0.4;

            for ring in [1.0, 2.0, 3.0] {
                ctx.draw(&Circle {
                    x: origin.0,
                    y: origin.1,
                    radius: radius * ring / 3.0,
                    color: if ring < 3.0 { Color::DarkGray } else { Color::Gray },
                });
            }
            let (north_x, north_y) = polar(origin, radius * 1.1, std::f64::consts::FRAC_PI_2);
            ctx.draw(&CanvasLine {
                x1: origin.0,
                y1: origin.1 + radius,
                x2: north_x,
                y2: north_y,
                color: Color::Gray,
            });

            let beam = (animation * std::f64::consts::TAU).rem_euclid(std::f64::consts::TAU);
            for step in (0..=TRAIL_STEPS).rev() {
                let theta = beam - TRAIL * f64::from(step) / f64::from(TRAIL_STEPS);
                let (x2, y2) = polar(origin, radius, theta);
                ctx.draw(&CanvasLine {
                    x1: origin.0,
                    y1: origin.1,
                    x2,
                    y2,
                    color: match step {
                        0 => Color::LightCyan,
                        1..=2 => Color::Cyan,
                        _ => Color::DarkGray,
                    },
                });
            }

            // Compass bearings run clockwise from north.
            for blip in blips {
                let theta = (90.0 - blip.bearing_deg).to_radians();
                let position = polar(origin, radius * blip.fraction, theta);
                let lit = behind_beam(beam, theta) < TRAIL;
                ctx.draw(&Points {
                    coords: &[position],
                    color: if lit { Color::White } else { blip.color },
                });
            }
        });
    f.render_widget(canvas, square);
}
