use ratatui::style::Color;
use serde::Serialize;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bands of the 0..=100 thermometer score.
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=25 => Self::Low,
            26..=50 => Self::Medium,
            51..=75 => Self::High,
            _ => Self::Critical,
        }
    }

    /// Level for a measured value against its regulatory limit.
    pub fn from_exceedance(value: f64, limit: f64) -> Option<Self> {
        if limit.is_nan() || limit <= 0.0 || !value.is_finite() {
            return None;
        }
        let ratio = value / limit;
        Some(if ratio <= 2.0 {
            Self::Low
        } else if ratio <= 10.0 {
            Self::Medium
        } else {
            Self::High
        })
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub const fn local_label(self) -> &'static str {
        match self {
            Self::Low => "Bajo",
            Self::Medium => "Medio",
            Self::High => "Alto",
            Self::Critical => "Crítico",
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::Low => Color::Green,
            Self::Medium => Color::Yellow,
            Self::High => Color::Rgb(249, 115, 22),
            Self::Critical => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThermometer {
    score: u8,
}

impl Default for RiskThermometer {
    fn default() -> Self {
        Self::new(45)
    }
}

impl RiskThermometer {
    pub fn new(score: u8) -> Self {
        Self {
            score: score.min(MAX_SCORE),
        }
    }

    pub const fn score(&self) -> u8 {
        self.score
    }

    pub const fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.score)
    }

    pub fn raise(&mut self, step: u8) {
        self.score = self.score.saturating_add(step).min(MAX_SCORE);
    }

    pub fn lower(&mut self, step: u8) {
        self.score = self.score.saturating_sub(step);
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.score) / f64::from(MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(26), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100).local_label(), "Crítico");
    }

    #[test]
    fn exceedance_bands() {
        assert_eq!(RiskLevel::from_exceedance(0.15, 0.1), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_exceedance(0.5, 0.1), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_exceedance(1.24, 0.1), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_exceedance(1.0, 0.0), None);
        assert_eq!(RiskLevel::from_exceedance(f64::NAN, 1.0), None);
    }

    #[test]
    fn thermometer_clamps() {
        let mut thermometer = RiskThermometer::new(250);
        assert_eq!(thermometer.score(), 100);
        thermometer.raise(10);
        assert_eq!(thermometer.score(), 100);
        thermometer.lower(120);
        assert_eq!(thermometer.score(), 0);
        assert_eq!(thermometer.level(), RiskLevel::Low);
        thermometer.raise(60);
        assert!((thermometer.ratio() - 0.6).abs() < f64::EPSILON);
    }
}
