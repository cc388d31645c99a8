//! Minimal SVG plot renderer.
//!
//! A [`Plot`] is a stack of layers drawn over a shared data extent. Layers
//! are drawn in insertion order; horizontal guides are drawn on top.

use std::fmt::Write;

/// Plot width in pixels.
pub const WIDTH: f64 = 576.0;
/// Plot height in pixels.
pub const HEIGHT: f64 = 288.0;
/// Margin around the plotting area.
pub const PADDING: f64 = 36.0;

const AXIS_COLOR: &str = "#444";
const DASH: &str = "4 3";

/// One drawable element of a plot.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Connected line through `(x, y)` points.
    Line {
        /// Data points.
        points: Vec<(f64, f64)>,
        /// Stroke colour.
        color: &'static str,
        /// Draw the line dashed.
        dashed: bool,
    },
    /// Line with the region down to zero filled.
    Area {
        /// Data points.
        points: Vec<(f64, f64)>,
        /// Fill and stroke colour.
        color: &'static str,
    },
    /// Unconnected markers.
    Points {
        /// Data points.
        points: Vec<(f64, f64)>,
        /// Marker colour.
        color: &'static str,
    },
    /// Vertical bars `(x_start, x_end, height)` rising from zero.
    Bars {
        /// Bar extents.
        bars: Vec<(f64, f64, f64)>,
        /// Fill colour.
        color: &'static str,
    },
}

impl Layer {
    fn extent_points(&self) -> Vec<(f64, f64)> {
        match self {
            Self::Line { points, .. } | Self::Points { points, .. } => points.clone(),
            Self::Area { points, .. } => {
                let mut out = points.clone();
                if let Some(&(x, _)) = points.first() {
                    out.push((x, 0.0));
                }
                out
            }
            Self::Bars { bars, .. } => bars
                .iter()
                .flat_map(|&(x0, x1, h)| [(x0, 0.0), (x1, h)])
                .collect(),
        }
    }
}

/// Horizontal reference line.
#[derive(Debug, Clone)]
pub struct Guide {
    /// Y value of the line.
    pub value: f64,
    /// Stroke colour.
    pub color: &'static str,
    /// Optional label drawn at the right end.
    pub label: Option<String>,
}

/// Builder for one SVG figure.
#[derive(Debug, Clone, Default)]
pub struct Plot {
    title: String,
    y_label: String,
    x_labels: Option<(String, String)>,
    layers: Vec<Layer>,
    guides: Vec<Guide>,
    include_zero: bool,
}

impl Plot {
    /// Start a plot with a title and y-axis label.
    pub fn new(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }

    /// Label the left and right ends of the x axis.
    #[must_use]
    pub fn x_labels(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.x_labels = Some((start.into(), end.into()));
        self
    }

    /// Add a layer.
    #[must_use]
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add a horizontal guide.
    #[must_use]
    pub fn guide(mut self, value: f64, color: &'static str, label: Option<&str>) -> Self {
        self.guides.push(Guide {
            value,
            color,
            label: label.map(str::to_string),
        });
        self
    }

    /// Force zero into the y range and draw a zero line.
    #[must_use]
    pub const fn include_zero(mut self) -> Self {
        self.include_zero = true;
        self
    }

    /// Render the figure as a standalone SVG document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = header(&self.title);

        let Some(frame) = self.frame() else {
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">No data</text>"#,
                x = WIDTH / 2.0,
                y = HEIGHT / 2.0
            );
            svg.push_str("</svg>");
            return svg;
        };

        self.draw_axes(&mut svg, &frame);
        for layer in &self.layers {
            draw_layer(&mut svg, &frame, layer);
        }
        for guide in &self.guides {
            draw_guide(&mut svg, &frame, guide);
        }

        svg.push_str("</svg>");
        svg
    }

    fn frame(&self) -> Option<Frame> {
        let mut points: Vec<(f64, f64)> = self
            .layers
            .iter()
            .flat_map(Layer::extent_points)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.is_empty() {
            return None;
        }
        if self.include_zero {
            points.push((points[0].0, 0.0));
        }

        let (x_min, x_max) = widen(min_max(points.iter().map(|p| p.0)));
        let guide_values = self.guides.iter().map(|g| g.value).filter(|v| v.is_finite());
        let (y_min, y_max) = widen(min_max(points.iter().map(|p| p.1).chain(guide_values)));

        Some(Frame {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    fn draw_axes(&self, svg: &mut String, frame: &Frame) {
        let bottom = HEIGHT - PADDING;
        let right = WIDTH - PADDING;
        let _ = write!(
            svg,
            r#"<line x1="{PADDING:.2}" y1="{PADDING:.2}" x2="{PADDING:.2}" y2="{bottom:.2}" stroke="{AXIS_COLOR}" stroke-width="1" /><line x1="{PADDING:.2}" y1="{bottom:.2}" x2="{right:.2}" y2="{bottom:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
        );

        for value in [frame.y_min, frame.y_max] {
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
                x = PADDING - 4.0,
                y = frame.sy(value) + 3.0,
                label = format_tick(value)
            );
        }

        if self.include_zero && frame.y_min < 0.0 && frame.y_max > 0.0 {
            let y = frame.sy(0.0);
            let _ = write!(
                svg,
                r##"<line x1="{PADDING:.2}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="#000" stroke-opacity="0.5" stroke-width="1" />"##,
            );
        }

        let (start, end) = self.x_labels.clone().unwrap_or_else(|| {
            (format_tick(frame.x_min), format_tick(frame.x_max))
        });
        let _ = write!(
            svg,
            r#"<text x="{PADDING:.2}" y="{y:.2}" text-anchor="start">{start}</text><text x="{right:.2}" y="{y:.2}" text-anchor="end">{end}</text>"#,
            y = bottom + 14.0,
            start = escape(&start),
            end = escape(&end)
        );

        if !self.y_label.is_empty() {
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">{label}</text>"#,
                x = 10.0,
                y = HEIGHT / 2.0,
                label = escape(&self.y_label)
            );
        }
    }
}

/// Data-to-pixel mapping for one plot.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn sx(&self, x: f64) -> f64 {
        let norm = (x - self.x_min) / (self.x_max - self.x_min);
        norm.mul_add(WIDTH - 2.0 * PADDING, PADDING)
    }

    fn sy(&self, y: f64) -> f64 {
        let norm = (y - self.y_min) / (self.y_max - self.y_min);
        (1.0 - norm).mul_add(HEIGHT - 2.0 * PADDING, PADDING)
    }

    fn sy_clamped(&self, y: f64) -> f64 {
        self.sy(y.clamp(self.y_min, self.y_max))
    }
}

fn header(title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style><rect width="100%" height="100%" fill="#fff" /><text x="{cx:.2}" y="18" text-anchor="middle" font-size="13" font-weight="bold" fill="#222">{title}</text>"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        title = escape(title)
    )
}

fn draw_layer(svg: &mut String, frame: &Frame, layer: &Layer) {
    match layer {
        Layer::Line {
            points,
            color,
            dashed,
        } => {
            let dash = if *dashed { DASH } else { "0" };
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" stroke-dasharray="{dash}" points="{coords}" />"#,
                coords = coords(frame, points)
            );
        }
        Layer::Area { points, color } => {
            let finite: Vec<(f64, f64)> = finite_points(points);
            if let (Some(first), Some(last)) = (finite.first(), finite.last()) {
                let base = frame.sy_clamped(0.0);
                let _ = write!(
                    svg,
                    r#"<polygon fill="{color}" fill-opacity="0.3" stroke="none" points="{x0:.2},{base:.2} {coords} {x1:.2},{base:.2}" />"#,
                    x0 = frame.sx(first.0),
                    x1 = frame.sx(last.0),
                    coords = coords(frame, &finite)
                );
            }
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{coords}" />"#,
                coords = coords(frame, &finite)
            );
        }
        Layer::Points { points, color } => {
            for (x, y) in finite_points(points) {
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="2" fill="{color}" fill-opacity="0.6" />"#,
                    cx = frame.sx(x),
                    cy = frame.sy(y)
                );
            }
        }
        Layer::Bars { bars, color } => {
            let zero = frame.sy_clamped(0.0);
            for &(x0, x1, h) in bars.iter().filter(|b| b.2.is_finite()) {
                let left = frame.sx(x0);
                let width = (frame.sx(x1) - left).max(1.0);
                let y = frame.sy(h);
                let _ = write!(
                    svg,
                    r#"<rect x="{left:.2}" y="{top:.2}" width="{width:.2}" height="{height:.2}" fill="{color}" fill-opacity="0.7" />"#,
                    top = y.min(zero),
                    height = (zero - y).abs()
                );
            }
        }
    }
}

fn draw_guide(svg: &mut String, frame: &Frame, guide: &Guide) {
    if !guide.value.is_finite() {
        return;
    }
    let y = frame.sy(guide.value);
    let right = WIDTH - PADDING;
    let _ = write!(
        svg,
        r#"<line x1="{PADDING:.2}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" stroke-dasharray="{DASH}" />"#,
        color = guide.color
    );
    if let Some(label) = &guide.label {
        let _ = write!(
            svg,
            r#"<text x="{right:.2}" y="{ty:.2}" text-anchor="end" fill="{color}" font-size="9">{label}</text>"#,
            ty = y - 4.0,
            color = guide.color,
            label = escape(label)
        );
    }
}

fn finite_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn coords(frame: &Frame, points: &[(f64, f64)]) -> String {
    finite_points(points)
        .iter()
        .map(|&(x, y)| format!("{:.2},{:.2}", frame.sx(x), frame.sy(y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Widen a degenerate range so the scale is defined.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo < hi {
        return (lo, hi);
    }
    let adjust = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
    (lo - adjust, hi + adjust)
}

/// Compact tick label.
pub fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if magnitude >= 1000.0 {
        format!("{value:.0}")
    } else if magnitude >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.4}")
    }
}

/// Escape text for inclusion in SVG/HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
