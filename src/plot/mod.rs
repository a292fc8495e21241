// src/plot/mod.rs
//! Hand-off to a charting backend. Nothing here draws; a [`LineGraph`] describes what
//! to draw and a [`Renderer`] decides how.
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use crate::parse::ResultTable;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graph has no series")]
    Empty,

    #[error("series {index} has {x} x values but {y} y values")]
    SeriesLengthMismatch { index: usize, x: usize, y: usize },

    #[error("{labels} legend labels for {series} series")]
    LabelCountMismatch { labels: usize, series: usize },

    #[error("{axis} axis limits are inverted ({min} > {max})")]
    InvertedLimits { axis: &'static str, min: f64, max: f64 },

    #[error("no series {category:?}/{subcategory:?} in table")]
    MissingSeries {
        category: String,
        subcategory: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line: x and y values borrowed from a [`ResultTable`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LineSeries<'a> {
    pub x: &'a [String],
    pub y: &'a [String],
}

/// Axis bounds. Either end may be left to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisLimits {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LegendLocation {
    #[default]
    #[serde(rename = "upper right")]
    UpperRight,
    #[serde(rename = "upper left")]
    UpperLeft,
    #[serde(rename = "lower left")]
    LowerLeft,
    #[serde(rename = "lower right")]
    LowerRight,
    #[serde(rename = "best")]
    Best,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LineGraph<'a> {
    pub series: Vec<LineSeries<'a>>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub legend: LegendLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_limits: Option<AxisLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_limits: Option<AxisLimits>,
}

impl<'a> LineGraph<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line plotting `y` against `x`, both given as (category, subcategory).
    pub fn line_from_table(
        mut self,
        table: &'a ResultTable,
        x: (&str, &str),
        y: (&str, &str),
        label: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let lookup = |(category, subcategory): (&str, &str)| {
            table
                .get(category, subcategory)
                .ok_or_else(|| RenderError::MissingSeries {
                    category: category.to_string(),
                    subcategory: subcategory.to_string(),
                })
        };
        let series = LineSeries {
            x: lookup(x)?,
            y: lookup(y)?,
        };
        self.series.push(series);
        self.labels.push(label.into());
        Ok(self)
    }

    pub fn line(mut self, x: &'a [String], y: &'a [String], label: impl Into<String>) -> Self {
        self.series.push(LineSeries { x, y });
        self.labels.push(label.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn legend(mut self, location: LegendLocation) -> Self {
        self.legend = location;
        self
    }

    pub fn x_limits(mut self, limits: AxisLimits) -> Self {
        self.x_limits = Some(limits);
        self
    }

    pub fn y_limits(mut self, limits: AxisLimits) -> Self {
        self.y_limits = Some(limits);
        self
    }

    /// Check the graph is drawable: at least one series, matching x/y lengths,
    /// one label per series and ordered axis limits.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.series.is_empty() {
            return Err(RenderError::Empty);
        }
        for (index, series) in self.series.iter().enumerate() {
            if series.x.len() != series.y.len() {
                return Err(RenderError::SeriesLengthMismatch {
                    index,
                    x: series.x.len(),
                    y: series.y.len(),
                });
            }
        }
        if self.labels.len() != self.series.len() {
            return Err(RenderError::LabelCountMismatch {
                labels: self.labels.len(),
                series: self.series.len(),
            });
        }
        for (axis, limits) in [("x", self.x_limits), ("y", self.y_limits)] {
            if let Some(AxisLimits {
                min: Some(min),
                max: Some(max),
            }) = limits
            {
                if min > max {
                    return Err(RenderError::InvertedLimits { axis, min, max });
                }
            }
        }
        Ok(())
    }
}

/// A charting backend.
pub trait Renderer {
    fn render(&mut self, graph: &LineGraph<'_>) -> Result<(), RenderError>;
}

/// Writes the graph description as JSON, for plotting tools outside this crate.
pub struct JsonRenderer<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, pretty: false }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, graph: &LineGraph<'_>) -> Result<(), RenderError> {
        graph.validate()?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, graph)?;
        } else {
            serde_json::to_writer(&mut self.out, graph)?;
        }
        writeln!(self.out)?;
        debug!(series = graph.series.len(), "rendered graph as JSON");
        Ok(())
    }
}
