//! Score chart: configuration, backends, and the controller owning the live
//! chart handle.

use crate::errors::ChartError;
use crate::models::ScoreSeries;
use crate::surface::{NodeId, Surface, escape_html};
use serde::Serialize;
use std::fmt::Write as _;

pub const CHART_CANVAS_ID: &str = "scoreChart";

const DATASET_LABEL: &str = "Mental Health Score";
const BORDER_COLOR: &str = "#3B82F6";
const FILL_COLOR: &str = "rgba(59, 130, 246, 0.1)";
const Y_MAX: f64 = 20.0;
const Y_STEP: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub tension: f64,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub scales: Scales,
    pub plugins: Plugins,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: ValueAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    pub begin_at_zero: bool,
    pub max: f64,
    pub ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub step_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
}

impl ChartConfig {
    /// Line chart of the score history on a fixed 0-20 axis.
    pub fn line(series: &ScoreSeries) -> Self {
        Self {
            kind: "line",
            data: ChartData {
                labels: series.dates.clone(),
                datasets: vec![Dataset {
                    label: DATASET_LABEL,
                    data: series.scores.clone(),
                    border_color: BORDER_COLOR,
                    background_color: FILL_COLOR,
                    tension: 0.4,
                    fill: true,
                }],
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                scales: Scales {
                    y: ValueAxis {
                        begin_at_zero: true,
                        max: Y_MAX,
                        ticks: Ticks { step_size: Y_STEP },
                    },
                },
                plugins: Plugins {
                    legend: Legend { display: false },
                },
            },
        }
    }
}

/// Something that can draw a [`ChartConfig`] onto a canvas element.
pub trait ChartBackend {
    type Handle;

    fn draw<S: Surface>(
        &mut self,
        surface: &mut S,
        canvas: NodeId,
        config: &ChartConfig,
    ) -> Result<Self::Handle, ChartError>;

    fn destroy<S: Surface>(&mut self, surface: &mut S, handle: Self::Handle);
}

/// Owns the single live chart on a page.
pub struct ChartController<B: ChartBackend> {
    backend: B,
    active: Option<B::Handle>,
}

impl<B: ChartBackend> ChartController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    /// Replaces any chart already drawn. Without a canvas on the page this
    /// does nothing.
    pub fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        series: &ScoreSeries,
    ) -> Result<(), ChartError> {
        let Some(canvas) = surface.element_by_id(CHART_CANVAS_ID) else {
            return Ok(());
        };
        self.destroy(surface);
        let config = ChartConfig::line(series);
        self.active = Some(self.backend.draw(surface, canvas, &config)?);
        Ok(())
    }

    pub fn destroy<S: Surface>(&mut self, surface: &mut S) {
        if let Some(handle) = self.active.take() {
            self.backend.destroy(surface, handle);
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.active.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Draws the chart as inline SVG inside the canvas element.
#[derive(Debug, Clone, Default)]
pub struct SvgLineChart;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 260.0;
const PADDING_X: f64 = 44.0;
const PADDING_Y: f64 = 34.0;
const TOP: f64 = 24.0;

impl ChartBackend for SvgLineChart {
    type Handle = NodeId;

    fn draw<S: Surface>(
        &mut self,
        surface: &mut S,
        canvas: NodeId,
        config: &ChartConfig,
    ) -> Result<NodeId, ChartError> {
        let dataset = config
            .data
            .datasets
            .first()
            .ok_or_else(|| ChartError::InvalidData("no dataset".into()))?;
        if let Some(bad) = dataset.data.iter().find(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(format!("score {bad} is not finite")));
        }

        let axis = &config.options.scales.y;
        let max = axis.max;
        let points = dataset.data.len();
        let x_step = if points > 1 {
            (WIDTH - PADDING_X * 2.0) / (points - 1) as f64
        } else {
            0.0
        };
        let scale_y = (HEIGHT - TOP - PADDING_Y) / max;
        let x = |index: usize| PADDING_X + index as f64 * x_step;
        let y = |value: f64| HEIGHT - PADDING_Y - value.clamp(0.0, max) * scale_y;

        let mut svg = format!(
            r#"<svg class="score-chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{}">"#,
            dataset.label
        );

        let mut tick = 0.0;
        while tick <= max {
            let y_pos = y(tick);
            let _ = write!(
                svg,
                r#"<line class="chart-grid" x1="{PADDING_X}" y1="{y_pos:.2}" x2="{}" y2="{y_pos:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{tick}</text>"#,
                WIDTH - PADDING_X,
                PADDING_X - 10.0,
                y_pos + 4.0
            );
            tick += axis.ticks.step_size;
        }

        let path = dataset
            .data
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let cmd = if index == 0 { 'M' } else { 'L' };
                format!("{cmd} {:.2} {:.2}", x(index), y(*value))
            })
            .collect::<Vec<_>>()
            .join(" ");
        if dataset.fill && points > 1 {
            let baseline = y(0.0);
            let _ = write!(
                svg,
                r#"<path class="chart-area" d="{path} L {:.2} {baseline:.2} L {:.2} {baseline:.2} Z" fill="{}" />"#,
                x(points - 1),
                x(0),
                dataset.background_color
            );
        }
        let _ = write!(
            svg,
            r#"<path class="chart-line" d="{path}" fill="none" stroke="{}" />"#,
            dataset.border_color
        );

        let label_every = if points > 8 { 2 } else { 1 };
        for (index, value) in dataset.data.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="4" />"#,
                x(index),
                y(*value)
            );
            if index % label_every == 0 {
                if let Some(label) = config.data.labels.get(index) {
                    let _ = write!(
                        svg,
                        r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                        x(index),
                        HEIGHT - PADDING_Y + 18.0,
                        escape_html(label)
                    );
                }
            }
        }
        svg.push_str("</svg>");

        surface.set_inner_html(canvas, &svg);
        surface.set_data(canvas, "chart", config.kind);
        Ok(canvas)
    }

    fn destroy<S: Surface>(&mut self, surface: &mut S, handle: NodeId) {
        surface.set_inner_html(handle, "");
        surface.remove_data(handle, "chart");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Document, Element};

    #[derive(Default)]
    struct CountingBackend {
        drawn: usize,
        destroyed: usize,
    }

    impl ChartBackend for CountingBackend {
        type Handle = usize;

        fn draw<S: Surface>(
            &mut self,
            _surface: &mut S,
            _canvas: NodeId,
            _config: &ChartConfig,
        ) -> Result<usize, ChartError> {
            self.drawn += 1;
            Ok(self.drawn)
        }

        fn destroy<S: Surface>(&mut self, _surface: &mut S, _handle: usize) {
            self.destroyed += 1;
        }
    }

    fn canvas_page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let canvas = doc
            .append_child(body, Element::new("div").with_id(CHART_CANVAS_ID))
            .unwrap();
        (doc, canvas)
    }

    fn series() -> ScoreSeries {
        ScoreSeries {
            scores: vec![14.0, 11.0, 8.0],
            dates: vec!["Sep 20".into(), "Sep 27".into(), "Oct 04".into()],
        }
    }

    #[test]
    fn config_pins_value_axis() {
        let value = serde_json::to_value(ChartConfig::line(&series())).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(value["options"]["scales"]["y"]["max"], 20.0);
        assert_eq!(value["options"]["scales"]["y"]["ticks"]["stepSize"], 5.0);
        assert_eq!(value["options"]["scales"]["y"]["beginAtZero"], true);
        assert_eq!(value["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(value["data"]["labels"][2], "Oct 04");
        assert_eq!(value["data"]["datasets"][0]["label"], "Mental Health Score");
    }

    #[test]
    fn render_destroys_previous_chart() {
        let (mut doc, _) = canvas_page();
        let mut chart = ChartController::new(CountingBackend::default());
        chart.render(&mut doc, &series()).unwrap();
        chart.render(&mut doc, &series()).unwrap();
        assert_eq!(chart.backend().drawn, 2);
        assert_eq!(chart.backend().destroyed, 1);
        assert!(chart.is_rendered());
    }

    #[test]
    fn render_without_canvas_is_noop() {
        let mut doc = Document::new();
        let mut chart = ChartController::new(CountingBackend::default());
        chart.render(&mut doc, &series()).unwrap();
        assert_eq!(chart.backend().drawn, 0);
        assert!(!chart.is_rendered());
    }

    #[test]
    fn svg_backend_draws_into_canvas() {
        let (mut doc, canvas) = canvas_page();
        let mut chart = ChartController::new(SvgLineChart);
        chart.render(&mut doc, &series()).unwrap();

        let markup = doc.inner_html(canvas).unwrap();
        assert!(markup.starts_with("<svg"));
        assert_eq!(markup.matches("chart-point").count(), 3);
        assert!(markup.contains("Oct 04"));
        assert_eq!(doc.data(canvas, "chart").as_deref(), Some("line"));

        chart.destroy(&mut doc);
        assert_eq!(doc.inner_html(canvas).unwrap(), "");
        assert!(!chart.is_rendered());
    }

    #[test]
    fn svg_backend_rejects_non_finite_scores() {
        let (mut doc, _) = canvas_page();
        let mut chart = ChartController::new(SvgLineChart);
        let bad = ScoreSeries {
            scores: vec![f64::NAN],
            dates: vec!["Oct 04".into()],
        };
        assert!(chart.render(&mut doc, &bad).is_err());
        assert!(!chart.is_rendered());
    }
}
