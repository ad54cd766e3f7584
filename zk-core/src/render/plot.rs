//! Interactive plot renderer.
//!
//! Lays the graph out in 2-D, colours nodes by degree centrality and draws
//! every citation as an arrow annotation. The result is one HTML file with an
//! inline SVG, a few lines of zoom/pan script and the figure data as JSON. It
//! loads nothing from the network.

use super::{open_in_viewer, GraphSink, Renderer};
use crate::error::Result;
use crate::graph::ZettelGraph;
use crate::layout::{compute_layout, LAYOUT_THRESHOLD};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Pixels between an arrowhead and the centre of its target node.
pub const STANDOFF_PX: f64 = 5.0;

/// Node marker diameter in pixels.
pub const MARKER_SIZE: f64 = 10.0;

const ARROW_COLOR: &str = "#666";
const ARROW_WIDTH: f64 = 2.0;
const MARKER_LINE_WIDTH: f64 = 2.0;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 800.0;
/// Plot margins: top, right (room for the colour bar), bottom, left.
const MARGIN: (f64, f64, f64, f64) = (40.0, 110.0, 20.0, 5.0);

/// YlGnBu colour scale stops, dark blue at 0 to light yellow at 1.
const YLGNBU: [(f64, (u8, u8, u8)); 9] = [
    (0.0, (8, 29, 88)),
    (0.125, (37, 52, 148)),
    (0.25, (34, 94, 168)),
    (0.375, (29, 145, 192)),
    (0.5, (65, 182, 196)),
    (0.625, (127, 205, 187)),
    (0.75, (199, 233, 180)),
    (0.875, (237, 248, 217)),
    (1.0, (255, 255, 217)),
];

/// Colour for `t` in `[0, 1]` on the reversed YlGnBu scale (low = light).
pub fn centrality_color(t: f64) -> String {
    let t = 1.0 - t.clamp(0.0, 1.0);
    let upper = YLGNBU
        .iter()
        .position(|&(stop, _)| stop >= t)
        .unwrap_or(YLGNBU.len() - 1)
        .max(1);
    let (s0, c0) = YLGNBU[upper - 1];
    let (s1, c1) = YLGNBU[upper];
    let f = ((t - s0) / (s1 - s0)).clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(c0.0, c1.0),
        mix(c0.1, c1.1),
        mix(c0.2, c1.2)
    )
}

/// Scatter trace of all nodes.
#[derive(Debug, Clone, Serialize)]
pub struct NodeTrace {
    pub ids: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Hover text, `"<id><br><title>"`.
    pub text: Vec<String>,
    /// Degree centrality per node.
    pub color: Vec<f64>,
    pub colorscale: String,
    pub reversescale: bool,
    pub size: f64,
    pub colorbar_title: String,
}

/// Arrow from a tail `(ax, ay)` to a head `(x, y)`, in data coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub source: String,
    pub target: String,
    pub ax: f64,
    pub ay: f64,
    pub x: f64,
    pub y: f64,
    pub arrowwidth: f64,
    pub arrowcolor: String,
    pub arrowhead: u8,
    /// Gap in pixels between the arrowhead and the target's centre.
    pub standoff: f64,
}

/// Everything needed to draw the plot.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub title: String,
    /// `kamada_kawai` or `random`.
    pub layout: String,
    pub nodes: NodeTrace,
    pub annotations: Vec<Annotation>,
}

impl Figure {
    /// Color scale bounds, as the plot auto-scales them.
    fn color_range(&self) -> (f64, f64) {
        let c = &self.nodes.color;
        let min = c.iter().copied().fold(f64::INFINITY, f64::min);
        let max = c.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if c.is_empty() {
            (0.0, 1.0)
        } else {
            (min, max)
        }
    }

    /// Fill colour of each node.
    pub fn node_colors(&self) -> Vec<String> {
        let (min, max) = self.color_range();
        self.nodes
            .color
            .iter()
            .map(|&c| {
                let t = if max > min { (c - min) / (max - min) } else { 0.5 };
                centrality_color(t)
            })
            .collect()
    }

    /// Serialise the figure as a standalone HTML page.
    pub fn to_html(&self) -> Result<String> {
        let data = serde_json::to_string(self)?.replace("</", "<\\/");

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_xml(&self.title)));
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");
        html.push_str(&self.to_svg());
        html.push_str("<script type=\"application/json\" id=\"zk-figure\">");
        html.push_str(&data);
        html.push_str("</script>\n");
        html.push_str(SCRIPT);
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    /// Inline SVG drawing of the figure.
    pub fn to_svg(&self) -> String {
        let (top, right, bottom, left) = MARGIN;
        let project = Projection::fit(&self.nodes.x, &self.nodes.y, left, top, WIDTH - right, HEIGHT - bottom);
        let colors = self.node_colors();

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg id=\"zk-plot\" xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\">\n",
            WIDTH, HEIGHT
        ));
        svg.push_str(&format!(
            "<defs><marker id=\"zk-arrow\" viewBox=\"0 0 10 10\" refX=\"9\" refY=\"5\" markerWidth=\"4\" markerHeight=\"4\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>{}</defs>\n",
            ARROW_COLOR,
            colorbar_gradient()
        ));
        if !self.title.is_empty() {
            svg.push_str(&format!(
                "<text class=\"zk-title\" x=\"{:.2}\" y=\"{:.2}\">{}</text>\n",
                left + 10.0,
                top * 0.65,
                escape_xml(&self.title)
            ));
        }

        svg.push_str("<g id=\"zk-viewport\">\n<g class=\"zk-edges\">\n");
        for a in &self.annotations {
            svg.push_str(&edge_path(a, &project));
        }
        svg.push_str("</g>\n<g class=\"zk-nodes\">\n");
        for (i, color) in colors.iter().enumerate() {
            let (px, py) = project.apply(self.nodes.x[i], self.nodes.y[i]);
            svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.1}\" fill=\"{}\" stroke-width=\"{}\" data-id=\"{}\"><title>{}</title></circle>\n",
                px,
                py,
                self.nodes.size / 2.0,
                color,
                MARKER_LINE_WIDTH,
                escape_xml(&self.nodes.ids[i]),
                escape_xml(&self.nodes.text[i].replace("<br>", "\n"))
            ));
        }
        svg.push_str("</g>\n</g>\n");
        svg.push_str(&self.colorbar(top, HEIGHT - bottom));
        svg.push_str("</svg>\n");
        svg
    }

    fn colorbar(&self, top: f64, bottom: f64) -> String {
        let (min, max) = self.color_range();
        let x = WIDTH - MARGIN.1 + 20.0;
        let bar_width = 15.0;
        let height = (bottom - top) * 0.8;
        let y = top + (bottom - top - height) / 2.0;
        format!(
            "<g class=\"zk-colorbar\">\
             <rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{bar_width}\" height=\"{height:.2}\" fill=\"url(#zk-colorscale)\"/>\
             <text x=\"{tx:.2}\" y=\"{y:.2}\" dominant-baseline=\"hanging\">{max:.2}</text>\
             <text x=\"{tx:.2}\" y=\"{yb:.2}\">{min:.2}</text>\
             <text x=\"{lx:.2}\" y=\"{ly:.2}\" transform=\"rotate(90 {lx:.2} {ly:.2})\" text-anchor=\"middle\">{title}</text>\
             </g>\n",
            tx = x + bar_width + 4.0,
            yb = y + height,
            lx = x + bar_width + 45.0,
            ly = y + height / 2.0,
            title = escape_xml(&self.nodes.colorbar_title),
        )
    }
}

/// Linear map from data coordinates to SVG pixels (y grows downwards).
struct Projection {
    x0: f64,
    y0: f64,
    sx: f64,
    sy: f64,
    left: f64,
    bottom: f64,
}

impl Projection {
    fn fit(xs: &[f64], ys: &[f64], left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let range = |v: &[f64]| {
            let min = v.iter().copied().fold(f64::INFINITY, f64::min);
            let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !min.is_finite() || !max.is_finite() {
                (-1.0, 1.0)
            } else if max - min < 1e-12 {
                (min - 1.0, max + 1.0)
            } else {
                (min, max)
            }
        };
        let (xmin, xmax) = range(xs);
        let (ymin, ymax) = range(ys);
        // Keep markers off the plot edge
        let pad = MARKER_SIZE;
        Self {
            x0: xmin,
            y0: ymin,
            sx: (right - left - 2.0 * pad) / (xmax - xmin),
            sy: (bottom - top - 2.0 * pad) / (ymax - ymin),
            left: left + pad,
            bottom: bottom - pad,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + (x - self.x0) * self.sx,
            self.bottom - (y - self.y0) * self.sy,
        )
    }
}

/// SVG path for one annotation, stopping `standoff` pixels short of the head.
fn edge_path(a: &Annotation, project: &Projection) -> String {
    let (tx, ty) = project.apply(a.ax, a.ay);
    let (hx, hy) = project.apply(a.x, a.y);
    let style = format!(
        "stroke=\"{}\" stroke-width=\"{}\" fill=\"none\" marker-end=\"url(#zk-arrow)\"",
        a.arrowcolor, a.arrowwidth
    );

    if a.source == a.target {
        // Small loop above the node
        let r = a.standoff;
        return format!(
            "<path d=\"M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}\" {}/>\n",
            hx - r,
            hy - r,
            hx - 4.0 * r,
            hy - 6.0 * r,
            hx + 4.0 * r,
            hy - 6.0 * r,
            hx + r,
            hy - r,
            style
        );
    }

    let (dx, dy) = (hx - tx, hy - ty);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= a.standoff {
        return String::new();
    }
    let k = (len - a.standoff) / len;
    format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" {}/>\n",
        tx,
        ty,
        tx + dx * k,
        ty + dy * k,
        style
    )
}

/// Vertical gradient for the colour bar, highest centrality at the top.
fn colorbar_gradient() -> String {
    let mut out =
        String::from("<linearGradient id=\"zk-colorscale\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">");
    for &(stop, _) in &YLGNBU {
        out.push_str(&format!(
            "<stop offset=\"{:.3}\" stop-color=\"{}\"/>",
            stop,
            centrality_color(stop)
        ));
    }
    out.push_str("</linearGradient>");
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"<style>
html, body { margin: 0; height: 100%; background: #fff; font-family: sans-serif; }
#zk-plot { width: 100%; height: 100%; cursor: grab; }
#zk-plot circle { stroke: #444; }
#zk-plot circle:hover { stroke: #000; }
.zk-title { font-size: 18px; }
.zk-colorbar text { font-size: 12px; fill: #444; }
</style>
"#;

const SCRIPT: &str = r#"<script>
(function () {
  var svg = document.getElementById("zk-plot");
  var view = document.getElementById("zk-viewport");
  var scale = 1, tx = 0, ty = 0, drag = null;
  function apply() {
    view.setAttribute("transform", "translate(" + tx + "," + ty + ") scale(" + scale + ")");
  }
  function toSvg(e) {
    var pt = svg.createSVGPoint();
    pt.x = e.clientX;
    pt.y = e.clientY;
    return pt.matrixTransform(svg.getScreenCTM().inverse());
  }
  svg.addEventListener("wheel", function (e) {
    e.preventDefault();
    var p = toSvg(e);
    var k = e.deltaY < 0 ? 1.1 : 1 / 1.1;
    tx = p.x - k * (p.x - tx);
    ty = p.y - k * (p.y - ty);
    scale *= k;
    apply();
  }, { passive: false });
  svg.addEventListener("mousedown", function (e) {
    var p = toSvg(e);
    drag = { x: p.x - tx, y: p.y - ty };
  });
  window.addEventListener("mousemove", function (e) {
    if (!drag) return;
    var p = toSvg(e);
    tx = p.x - drag.x;
    ty = p.y - drag.y;
    apply();
  });
  window.addEventListener("mouseup", function () { drag = null; });
  svg.addEventListener("dblclick", function () { scale = 1; tx = 0; ty = 0; apply(); });
})();
</script>
"#;

/// Self-contained interactive HTML plot of the link graph.
pub struct PlotRenderer {
    graph: ZettelGraph,
    title: String,
    layout_threshold: usize,
    seed: Option<u64>,
}

impl Default for PlotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotRenderer {
    pub fn new() -> Self {
        Self {
            graph: ZettelGraph::new(),
            title: String::new(),
            layout_threshold: LAYOUT_THRESHOLD,
            seed: None,
        }
    }

    /// Builder: title shown above the plot
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: node count from which the random layout is used
    pub fn with_layout_threshold(mut self, threshold: usize) -> Self {
        self.layout_threshold = threshold;
        self
    }

    /// Builder: seed for the random layout
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn graph(&self) -> &ZettelGraph {
        &self.graph
    }

    /// Lay out the graph and assemble the figure.
    pub fn build_figure(&self) -> Figure {
        let positions = compute_layout(&self.graph, self.layout_threshold, self.seed);
        let layout = if self.graph.node_count() < self.layout_threshold {
            "kamada_kawai"
        } else {
            "random"
        };
        self.build_figure_with(&positions, layout)
    }

    /// Assemble the figure from precomputed positions in `node_ids()` order.
    pub fn build_figure_with(&self, positions: &[(f64, f64)], layout: &str) -> Figure {
        let nodes: Vec<_> = self.graph.nodes().collect();

        let trace = NodeTrace {
            ids: nodes.iter().map(|n| n.id.clone()).collect(),
            x: positions.iter().map(|p| p.0).collect(),
            y: positions.iter().map(|p| p.1).collect(),
            text: nodes
                .iter()
                .map(|n| format!("{}<br>{}", n.id, n.title))
                .collect(),
            color: self.graph.degree_centrality(),
            colorscale: "YlGnBu".to_string(),
            reversescale: true,
            size: MARKER_SIZE,
            colorbar_title: "Centrality".to_string(),
        };

        let annotations = self
            .graph
            .edge_positions()
            .into_iter()
            .map(|(s, t)| Annotation {
                source: nodes[s].id.clone(),
                target: nodes[t].id.clone(),
                ax: positions[s].0,
                ay: positions[s].1,
                x: positions[t].0,
                y: positions[t].1,
                arrowwidth: ARROW_WIDTH,
                arrowcolor: ARROW_COLOR.to_string(),
                arrowhead: 2,
                standoff: STANDOFF_PX,
            })
            .collect();

        Figure {
            title: self.title.clone(),
            layout: layout.to_string(),
            nodes: trace,
            annotations,
        }
    }
}

impl GraphSink for PlotRenderer {
    fn add_node(&mut self, id: &str, title: &str) {
        self.graph.add_node(id, title);
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        self.graph.add_edge(source, target);
    }
}

impl Renderer for PlotRenderer {
    /// Writes `<output>.html` (the extension is added when missing).
    fn render(&mut self, output: &str, view: bool) -> Result<PathBuf> {
        let path = if output.ends_with(".html") {
            PathBuf::from(output)
        } else {
            PathBuf::from(format!("{}.html", output))
        };

        let figure = self.build_figure();
        tracing::info!(
            "Writing {} nodes, {} edges ({} layout) to {}",
            figure.nodes.ids.len(),
            figure.annotations.len(),
            figure.layout,
            path.display()
        );
        fs::write(&path, figure.to_html()?)?;

        if view {
            open_in_viewer(&path);
        }
        Ok(path)
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
