//! Conversion-over-time series.
//!
//! Every result event becomes one point on a shared time axis. A point
//! carries a value for every series: the event's own variant gets the
//! measured transformation, the other variants repeat their last known
//! value so each curve stays continuous.

use std::collections::BTreeMap;

use abx_allocator::round2;
use abx_protocol::ExperimentResults;
use serde::Serialize;

/// Format of the point labels on the time axis.
pub const POINT_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One curve of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Variant id, also the key of the point values.
    pub key: String,
    /// Legend label, `name (id)`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Variant that produced the event.
    pub variant: String,
    /// Time axis label.
    pub name: String,
    pub label: String,
    pub date: chrono::NaiveDateTime,
    pub transformation: f64,
    /// Value per series key at this point.
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<Series>,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value of series `key` at point `index`.
    pub fn value(&self, index: usize, key: &str) -> Option<f64> {
        self.points.get(index).and_then(|p| p.values.get(key)).copied()
    }
}

pub fn build_chart_data(results: &ExperimentResults) -> ChartData {
    let series: Vec<Series> = results
        .results
        .iter()
        .map(|r| Series {
            key: r.variant.id.clone(),
            label: r.variant.label(),
        })
        .collect();

    let mut points: Vec<ChartPoint> = results
        .results
        .iter()
        .flat_map(|r| {
            let label = r.variant.label();
            r.events.iter().map(move |e| {
                let transformation = round2(e.transformation);
                ChartPoint {
                    variant: e.variant_id.clone(),
                    name: e.date.format(POINT_LABEL_FORMAT).to_string(),
                    label: label.clone(),
                    date: e.date,
                    transformation,
                    values: BTreeMap::from([(e.variant_id.clone(), transformation)]),
                }
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);

    for s in &series {
        let mut last = 0.0;
        for point in &mut points {
            if point.variant == s.key {
                last = point.transformation;
            } else {
                point.values.insert(s.key.clone(), round2(last));
            }
        }
    }

    tracing::debug!(series = series.len(), points = points.len(), "chart data built");
    ChartData { series, points }
}
