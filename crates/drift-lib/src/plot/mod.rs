use crate::metrics::histogram::Bin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

/// Backend-agnostic figure; rendering lives with the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

const SERIES_COLORS: [u32; 5] = [0x1F77B4, 0x2CA02C, 0xD62728, 0xFF7F0E, 0x9467BD];

/// Color for the n-th series, assigned mechanically from a fixed cycle.
pub fn series_color(index: usize) -> Color {
    Color(SERIES_COLORS[index % SERIES_COLORS.len()])
}

/// Percentile curves (1..=99) for one or more chains on a shared figure.
pub fn figure_from_percentiles(curves: &[(String, Vec<f64>)]) -> Figure {
    let mut fig = Figure::new(Some("Timestamp delta percentiles".into()));
    fig.x.label = Some("Percentile".into());
    fig.y.label = Some("Delta (ms)".into());
    for (index, (chain, curve)) in curves.iter().enumerate() {
        let points: Vec<[f64; 2]> = curve
            .iter()
            .enumerate()
            .map(|(i, value)| [(i + 1) as f64, *value])
            .collect();
        fig.add_series(Series::Line(LineSeries {
            name: chain.clone(),
            points,
            style: Style {
                width: 2.0,
                color: series_color(index),
            },
        }));
    }
    fig
}

/// Frequency distribution of one chain's deviations, one point per bin
/// midpoint.
pub fn figure_from_histogram(chain: &str, bins: &[Bin]) -> Figure {
    let mut fig = Figure::new(Some(format!("{} delta distribution", chain)));
    fig.x.label = Some("Delta (ms)".into());
    fig.y.label = Some("Blocks".into());
    let points: Vec<[f64; 2]> = bins
        .iter()
        .map(|bin| [(bin.lower_ms + bin.upper_ms) / 2.0, bin.count as f64])
        .collect();
    fig.add_series(Series::Line(LineSeries {
        name: chain.into(),
        points,
        style: Style {
            width: 1.4,
            color: series_color(0),
        },
    }));
    fig
}
