//! Graph Renderer.
//!
//! Turns an aggregated series into a line chart: one polyline with markers per
//! concern, timestamps on x, intensity on y. The artifact carries both the SVG
//! image and the structured points, so headless consumers can skip the image.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, instrument};

use crate::analysis::taxonomy::MAX_SEVERITY;
use crate::error::AppError;
use crate::timeline::{AggregatedSeries, ConcernSeries, Timeframe};

/// Shown to callers when a window holds nothing to plot
pub const NO_DATA_MESSAGE: &str = "No data available for this timeframe.";

const X_LABEL: &str = "Timestamp";
const Y_LABEL: &str = "Intensity";

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 190.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
const X_TICKS: i32 = 5;
const MARKER_RADIUS: f64 = 4.0;

/// Line colors, cycled when there are more concerns than colors
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// A rendered chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub title: String,
    pub timeframe: String,
    pub x_label: String,
    pub y_label: String,
    /// Plotted data, legend order
    pub series: Vec<ConcernSeries>,
    /// Standalone SVG document
    pub svg: String,
}

impl ChartArtifact {
    /// SVG encoded as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.svg.as_bytes())
    }

    /// `data:` URI suitable for an `<img src>`
    pub fn data_uri(&self) -> String {
        format!("data:image/svg+xml;base64,{}", self.to_base64())
    }

    /// Legend entries
    pub fn legend(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Result of a render request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Nothing to plot in the requested window
    NoData,
    Rendered(ChartArtifact),
}

impl RenderOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, RenderOutcome::NoData)
    }

    pub fn artifact(&self) -> Option<&ChartArtifact> {
        match self {
            RenderOutcome::Rendered(artifact) => Some(artifact),
            RenderOutcome::NoData => None,
        }
    }
}

/// Renders aggregated series to SVG line charts
#[derive(Debug, Clone, Copy)]
pub struct GraphRenderer {
    width: u32,
    height: u32,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl GraphRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Chart title for a timeframe label, e.g. `daily` -> `... (Daily)`
    pub fn title_for(timeframe_label: &str) -> String {
        let label = match Timeframe::parse(timeframe_label) {
            Some(timeframe) => timeframe.title().to_string(),
            None => capitalize(timeframe_label),
        };
        format!("Mental Health Intensity Over Time ({})", label)
    }

    /// Render `series`. Empty input is `NoData`, never an error.
    #[instrument(skip(self, series), fields(keys = series.len()))]
    pub fn render(
        &self,
        series: &AggregatedSeries,
        timeframe_label: &str,
    ) -> Result<RenderOutcome, AppError> {
        if series.point_count() == 0 {
            debug!("Nothing to render");
            return Ok(RenderOutcome::NoData);
        }

        let title = Self::title_for(timeframe_label);
        let svg = self.draw(series, &title)?;

        Ok(RenderOutcome::Rendered(ChartArtifact {
            title,
            timeframe: timeframe_label.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            series: series.iter().cloned().collect(),
            svg,
        }))
    }

    fn draw(&self, series: &AggregatedSeries, title: &str) -> Result<String, AppError> {
        let width = self.width as f64;
        let height = self.height as f64;
        let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
        if plot_width <= 0.0 || plot_height <= 0.0 {
            return Err(AppError::Render(format!(
                "Canvas {}x{} is too small",
                self.width, self.height
            )));
        }

        let (t_min, t_max) = time_bounds(series)
            .ok_or_else(|| AppError::Render("Series has no points".to_string()))?;
        let span_ms = (t_max - t_min).num_milliseconds().max(1) as f64;

        let x = |t: DateTime<Utc>| {
            MARGIN_LEFT + (t - t_min).num_milliseconds() as f64 / span_ms * plot_width
        };
        let y = |v: f64| MARGIN_TOP + plot_height - v / MAX_SEVERITY as f64 * plot_height;

        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="28" font-size="16" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_width / 2.0,
            escape_xml(title)
        )?;

        // Y axis grid, fixed to the severity scale
        for level in (0..=MAX_SEVERITY).step_by(2) {
            let py = y(level as f64);
            writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="#e0e0e0"/>"##,
                MARGIN_LEFT,
                MARGIN_LEFT + plot_width
            )?;
            writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 8.0,
                py + 4.0,
                level
            )?;
        }

        // X axis ticks
        let tick_format = if t_max - t_min <= Duration::days(1) {
            "%H:%M"
        } else {
            "%m-%d %H:%M"
        };
        for i in 0..X_TICKS {
            let fraction = i as f64 / (X_TICKS - 1) as f64;
            let tick = t_min + Duration::milliseconds((span_ms * fraction) as i64);
            let px = x(tick);
            writeln!(
                svg,
                r##"<line x1="{px:.1}" y1="{:.1}" x2="{px:.1}" y2="{:.1}" stroke="#333"/>"##,
                MARGIN_TOP + plot_height,
                MARGIN_TOP + plot_height + 5.0
            )?;
            writeln!(
                svg,
                r#"<text x="{px:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                MARGIN_TOP + plot_height + 20.0,
                tick.format(tick_format)
            )?;
        }

        writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#333"/>"##,
            MARGIN_LEFT, MARGIN_TOP, plot_width, plot_height
        )?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_width / 2.0,
            height - 20.0,
            X_LABEL
        )?;
        writeln!(
            svg,
            r#"<text x="18" y="{:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_height / 2.0,
            MARGIN_TOP + plot_height / 2.0,
            Y_LABEL
        )?;

        for (index, concern) in series.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            let points: Vec<(f64, f64)> = concern
                .points
                .iter()
                .map(|p| (x(p.timestamp), y(p.intensity as f64)))
                .collect();

            let mut path = String::new();
            for (px, py) in &points {
                write!(path, "{:.1},{:.1} ", px, py)?;
            }
            writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                color,
                path.trim_end()
            )?;
            for (px, py) in &points {
                writeln!(
                    svg,
                    r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"/>"#,
                    px, py, MARKER_RADIUS, color
                )?;
            }

            let legend_x = MARGIN_LEFT + plot_width + 20.0;
            let legend_y = MARGIN_TOP + 10.0 + index as f64 * 20.0;
            writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
                legend_x, legend_y, color
            )?;
            writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
                legend_x + 18.0,
                legend_y + 10.0,
                escape_xml(&concern.key)
            )?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

/// Earliest and latest timestamps, padded when they coincide
fn time_bounds(series: &AggregatedSeries) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut timestamps = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.timestamp));
    let first = timestamps.next()?;
    let (min, max) = timestamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));

    if min == max {
        Some((min - Duration::minutes(30), max + Duration::minutes(30)))
    } else {
        Some((min, max))
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
