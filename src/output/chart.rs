//! Latency chart rendering
//!
//! The chart is drawn with ratatui into an off-screen [`Buffer`] and the
//! buffer is then serialized to text, so it can be printed inline like any
//! other output instead of taking over the terminal.

use super::theme::Theme;
use crate::defaults::{CHART_HEIGHT, CHART_WIDTH};
use crate::error::{AppError, Result};
use colored::{Color as TermColor, Colorize};
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};

/// Number of horizontal grid lines and y axis labels
const Y_DIVISIONS: usize = 4;

/// What the chart shows: the window contents plus the host for the title
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub host: &'a str,
    pub sequences: &'a [u64],
    pub latencies: &'a [f64],
}

impl<'a> ChartData<'a> {
    fn points(&self) -> Vec<(f64, f64)> {
        self.sequences
            .iter()
            .zip(self.latencies)
            .map(|(&sequence, &latency)| (sequence as f64, latency))
            .collect()
    }
}

/// Turns window contents into a block of terminal lines, each ending in `\n`
pub trait ChartRenderer: Send {
    fn render(&self, data: &ChartData<'_>) -> Result<String>;
}

/// Line plot with point markers, grid lines and labeled axes
#[derive(Debug, Clone)]
pub struct TerminalChart {
    width: u16,
    height: u16,
    theme: Theme,
}

impl TerminalChart {
    pub fn new(theme: Theme) -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            theme,
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw(&self, data: &ChartData<'_>) -> Result<Buffer> {
        if data.sequences.len() != data.latencies.len() {
            return Err(AppError::render(format!(
                "chart series length mismatch: {} sequences, {} latencies",
                data.sequences.len(),
                data.latencies.len()
            )));
        }

        let palette = self.theme.chart;
        let points = data.points();
        let x_bounds = sequence_bounds(data.sequences);
        let y_bounds = latency_bounds(data.latencies);
        let x_ticks = x_ticks(x_bounds);
        let y_ticks = y_ticks(y_bounds);

        let horizontal: Vec<Vec<(f64, f64)>> = y_ticks
            .iter()
            .map(|&y| vec![(x_bounds[0], y), (x_bounds[1], y)])
            .collect();
        let vertical: Vec<Vec<(f64, f64)>> = x_ticks
            .iter()
            .map(|&x| vec![(x, y_bounds[0]), (x, y_bounds[1])])
            .collect();

        let grid_style = Style::default().fg(palette.grid);
        let mut datasets: Vec<Dataset<'_>> = horizontal
            .iter()
            .chain(vertical.iter())
            .map(|segment| {
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(grid_style)
                    .data(segment)
            })
            .collect();

        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(palette.line))
                .data(&points),
        );
        datasets.push(
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(palette.points))
                .data(&points),
        );

        let axis_style = Style::default().fg(palette.axis);
        let title = Line::from(Span::styled(
            format!(" Latency Chart - {} ", data.host),
            Style::default().fg(palette.title).add_modifier(Modifier::BOLD),
        ));

        let chart = Chart::new(datasets)
            .style(Style::default().bg(palette.background))
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(palette.border))
                    .style(Style::default().bg(palette.background)),
            )
            .x_axis(
                Axis::default()
                    .title("Sequence")
                    .style(axis_style)
                    .bounds(x_bounds)
                    .labels(
                        x_ticks
                            .iter()
                            .map(|x| Line::from(format!("{:.0}", x)))
                            .collect::<Vec<_>>(),
                    ),
            )
            .y_axis(
                Axis::default()
                    .title("Latency (ms)")
                    .style(axis_style)
                    .bounds(y_bounds)
                    .labels(
                        y_ticks
                            .iter()
                            .map(|y| Line::from(format!("{:.1}", y)))
                            .collect::<Vec<_>>(),
                    ),
            );

        let area = Rect::new(0, 0, self.width, self.height);
        let mut buffer = Buffer::empty(area);
        chart.render(area, &mut buffer);
        Ok(buffer)
    }
}

impl ChartRenderer for TerminalChart {
    fn render(&self, data: &ChartData<'_>) -> Result<String> {
        let buffer = self.draw(data)?;
        Ok(buffer_to_text(&buffer, self.theme.is_enabled()))
    }
}

/// X range covering the window; a single point gets one unit of padding per side
fn sequence_bounds(sequences: &[u64]) -> [f64; 2] {
    let min = sequences.iter().copied().min().unwrap_or(0) as f64;
    let max = sequences.iter().copied().max().unwrap_or(0) as f64;
    if max > min {
        [min, max]
    } else {
        [min - 1.0, max + 1.0]
    }
}

/// Y range around the data with 10% headroom, never below zero
fn latency_bounds(latencies: &[f64]) -> [f64; 2] {
    let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
    let max = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }

    let span = max - min;
    let padding = if span > 0.0 { span * 0.1 } else { (max.abs() * 0.1).max(1.0) };
    [(min - padding).max(0.0), max + padding]
}

/// Evenly spaced y values from bottom to top, inclusive
fn y_ticks(bounds: [f64; 2]) -> Vec<f64> {
    let step = (bounds[1] - bounds[0]) / Y_DIVISIONS as f64;
    (0..=Y_DIVISIONS).map(|i| bounds[0] + step * i as f64).collect()
}

/// First, middle and last x values
fn x_ticks(bounds: [f64; 2]) -> Vec<f64> {
    vec![bounds[0], (bounds[0] + bounds[1]) / 2.0, bounds[1]]
}

/// Serialize a buffer row by row, one line per row
pub fn buffer_to_text(buffer: &Buffer, with_color: bool) -> String {
    let area = buffer.area;
    let mut text = String::with_capacity(usize::from(area.width + 1) * usize::from(area.height));

    for y in area.top()..area.bottom() {
        let mut run = String::new();
        let mut run_style: Option<CellStyle> = None;

        for x in area.left()..area.right() {
            let Some(cell) = buffer.cell((x, y)) else {
                continue;
            };
            let style = CellStyle::of(cell);
            if with_color && run_style != Some(style) {
                if let Some(previous) = run_style {
                    text.push_str(&previous.paint(&run));
                    run.clear();
                }
                run_style = Some(style);
            }
            run.push_str(cell.symbol());
        }

        match run_style {
            Some(style) if with_color => text.push_str(&style.paint(&run)),
            _ => text.push_str(&run),
        }
        text.push('\n');
    }

    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: Color,
    bg: Color,
    bold: bool,
}

impl CellStyle {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            bold: cell.modifier.contains(Modifier::BOLD),
        }
    }

    fn paint(&self, text: &str) -> String {
        let mut painted = text.normal();
        if let Some(fg) = term_color(self.fg) {
            painted = painted.color(fg);
        }
        if let Some(bg) = term_color(self.bg) {
            painted = painted.on_color(bg);
        }
        if self.bold {
            painted = painted.bold();
        }
        painted.to_string()
    }
}

fn term_color(color: Color) -> Option<TermColor> {
    let mapped = match color {
        Color::Reset | Color::Indexed(_) => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::Red,
        Color::Green => TermColor::Green,
        Color::Yellow => TermColor::Yellow,
        Color::Blue => TermColor::Blue,
        Color::Magenta => TermColor::Magenta,
        Color::Cyan => TermColor::Cyan,
        Color::Gray => TermColor::White,
        Color::DarkGray => TermColor::BrightBlack,
        Color::LightRed => TermColor::BrightRed,
        Color::LightGreen => TermColor::BrightGreen,
        Color::LightYellow => TermColor::BrightYellow,
        Color::LightBlue => TermColor::BrightBlue,
        Color::LightMagenta => TermColor::BrightMagenta,
        Color::LightCyan => TermColor::BrightCyan,
        Color::White => TermColor::BrightWhite,
        Color::Rgb(r, g, b) => TermColor::TrueColor { r, g, b },
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(sequences: &[u64], latencies: &[f64]) -> String {
        let chart = TerminalChart::new(Theme::plain());
        chart
            .render(&ChartData {
                host: "example.com",
                sequences,
                latencies,
            })
            .unwrap()
    }

    #[test]
    fn test_chart_has_fixed_height() {
        let text = render_plain(&[1, 2, 3], &[10.0, 20.0, 15.0]);
        assert_eq!(text.matches('\n').count(), usize::from(CHART_HEIGHT));
        assert!(text.ends_with('\n'));
        for line in text.lines() {
            assert_eq!(line.chars().count(), usize::from(CHART_WIDTH));
        }
    }

    #[test]
    fn test_chart_shows_title_and_axes() {
        let text = render_plain(&[1, 2, 3], &[10.0, 20.0, 15.0]);
        assert!(text.contains("Latency Chart - example.com"));
        assert!(text.contains("Sequence"));
        assert!(text.contains("Latency (ms)"));
        // x labels at both ends of the window
        assert!(text.contains('1'));
        assert!(text.contains('3'));
    }

    #[test]
    fn test_plain_chart_has_no_escape_codes() {
        let text = render_plain(&[4], &[12.5]);
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_single_point_renders() {
        let text = render_plain(&[7], &[0.0]);
        assert_eq!(text.lines().count(), usize::from(CHART_HEIGHT));
    }

    #[test]
    fn test_length_mismatch_is_render_error() {
        let chart = TerminalChart::new(Theme::plain());
        let err = chart
            .render(&ChartData {
                host: "h",
                sequences: &[1, 2],
                latencies: &[1.0],
            })
            .unwrap_err();
        assert_eq!(err.category(), "RENDER");
    }

    #[test]
    fn test_custom_size() {
        let chart = TerminalChart::new(Theme::plain()).with_size(40, 10);
        assert_eq!(chart.size(), (40, 10));
        let text = chart
            .render(&ChartData {
                host: "h",
                sequences: &[1, 2],
                latencies: &[3.0, 4.0],
            })
            .unwrap();
        assert_eq!(text.lines().count(), 10);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(sequence_bounds(&[5]), [4.0, 6.0]);
        assert_eq!(sequence_bounds(&[3, 9, 4]), [3.0, 9.0]);

        let [low, high] = latency_bounds(&[10.0, 20.0]);
        assert!((low - 9.0).abs() < 1e-9);
        assert!((high - 21.0).abs() < 1e-9);

        assert_eq!(latency_bounds(&[0.5]), [0.0, 1.5]);
        assert_eq!(latency_bounds(&[]), [0.0, 1.0]);
    }

    #[test]
    fn test_ticks_span_bounds() {
        let ticks = y_ticks([0.0, 40.0]);
        assert_eq!(ticks, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(x_ticks([2.0, 6.0]), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_colored_buffer_serialization() {
        colored::control::set_override(true);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 3, 1));
        buffer.set_string(0, 0, "ab", Style::default().fg(Color::LightGreen));
        let text = buffer_to_text(&buffer, true);
        colored::control::unset_override();

        assert!(text.contains('\x1b'));
        assert!(text.contains("ab"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_term_color_mapping() {
        assert_eq!(term_color(Color::Reset), None);
        assert_eq!(term_color(Color::DarkGray), Some(TermColor::BrightBlack));
        assert_eq!(
            term_color(Color::Rgb(1, 2, 3)),
            Some(TermColor::TrueColor { r: 1, g: 2, b: 3 })
        );
    }
}
