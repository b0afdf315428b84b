//! Color theme passed to everything that produces terminal text

use colored::{Color, Colorize};
use ratatui::style::Color as ChartColor;

/// Colors for status text and the chart
#[derive(Debug, Clone)]
pub struct Theme {
    enabled: bool,
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub chart: ChartPalette,
}

/// Dark chart styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    pub background: ChartColor,
    pub border: ChartColor,
    pub title: ChartColor,
    pub axis: ChartColor,
    pub grid: ChartColor,
    pub line: ChartColor,
    pub points: ChartColor,
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            background: ChartColor::Black,
            border: ChartColor::DarkGray,
            title: ChartColor::White,
            axis: ChartColor::Gray,
            grid: ChartColor::DarkGray,
            line: ChartColor::LightGreen,
            points: ChartColor::LightCyan,
        }
    }
}

impl Theme {
    /// Colored theme
    pub fn colored() -> Self {
        Self {
            enabled: true,
            header: Color::BrightCyan,
            success: Color::BrightGreen,
            warning: Color::BrightYellow,
            error: Color::BrightRed,
            info: Color::BrightCyan,
            muted: Color::BrightBlack,
            chart: ChartPalette::default(),
        }
    }

    /// Theme that emits no color codes at all
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::colored()
        }
    }

    pub fn new(enable_color: bool) -> Self {
        if enable_color {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Apply `color` to `text` when colors are enabled
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold `text` when colors are enabled
    pub fn bold(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold and colored
    pub fn strong(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Loss percentages are green at zero and red otherwise
    pub fn loss_color(&self, loss_percent: f64) -> Color {
        if loss_percent > 0.0 {
            self.error
        } else {
            self.success
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_passes_text_through() {
        let theme = Theme::plain();
        assert!(!theme.is_enabled());
        assert_eq!(theme.paint("12.5ms", theme.info), "12.5ms");
        assert_eq!(theme.bold("Current:"), "Current:");
        assert_eq!(theme.strong("PING", theme.header), "PING");
    }

    #[test]
    fn test_loss_color() {
        let theme = Theme::colored();
        assert_eq!(theme.loss_color(0.0), theme.success);
        assert_eq!(theme.loss_color(0.1), theme.error);
    }

    #[test]
    fn test_new_selects_theme() {
        assert!(Theme::new(true).is_enabled());
        assert!(!Theme::new(false).is_enabled());
        assert_eq!(Theme::new(false).chart, ChartPalette::default());
    }
}
