//! Terminal output: chart rendering, status text and in-place redraw
//!
//! The sampler composes a [`Frame`] from the chart and the live stats line
//! and hands it to a [`FrameBuffer`], which prefixes the erase sequence for
//! whatever was drawn before.

pub mod chart;
pub mod formatter;
pub mod frame;
pub mod theme;

pub use chart::{ChartData, ChartRenderer, TerminalChart};
pub use formatter::{format_stats, StatusFormatter, NOTICE_LINES};
pub use frame::{Frame, FrameBuffer, ERASE_LINE};
pub use theme::{ChartPalette, Theme};
