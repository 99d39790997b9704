//! Experiment results: the textual report (winner, population, conversion
//! per variant) and the time series drawn on the conversion chart.

pub mod chart;
pub mod report;

pub use chart::{build_chart_data, ChartData, ChartPoint, Series};
pub use report::{series_color, ResultsReport, VariantLine, SERIES_COLORS};
