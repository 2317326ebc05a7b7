use crate::chart::{Bar, ChartData, ChartSpec, Point, Surface, SurfaceFactory};
use crate::markup::escape_html;
use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 36.0;
const MARGIN_BOTTOM: f64 = 44.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgSurfaceFactory;

impl SurfaceFactory for SvgSurfaceFactory {
    type Surface = SvgSurface;

    fn create(&self, chart_id: &str) -> anyhow::Result<SvgSurface> {
        Ok(SvgSurface {
            chart_id: chart_id.to_string(),
            markup: None,
        })
    }
}

/// Inline `<svg>` element for one chart.
#[derive(Debug)]
pub struct SvgSurface {
    chart_id: String,
    markup: Option<String>,
}

impl SvgSurface {
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }
}

impl Surface for SvgSurface {
    fn draw(&mut self, spec: &ChartSpec) -> anyhow::Result<()> {
        self.markup = Some(render_svg(&self.chart_id, spec)?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.markup = None;
    }
}

pub fn render_svg(chart_id: &str, spec: &ChartSpec) -> anyhow::Result<String> {
    let mut out = String::new();
    write!(
        out,
        r#"<svg id="chart-{id}" class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{title}" xmlns="http://www.w3.org/2000/svg">"#,
        id = escape_html(chart_id),
        title = escape_html(&spec.title),
    )?;
    write!(
        out,
        r#"<text class="chart__title" x="{x}" y="20" text-anchor="middle">{title}</text>"#,
        x = WIDTH / 2.0,
        title = escape_html(&spec.title),
    )?;

    if spec.is_empty() {
        write!(
            out,
            r#"<text class="chart__empty" x="{x}" y="{y}" text-anchor="middle">No data</text>"#,
            x = WIDTH / 2.0,
            y = HEIGHT / 2.0,
        )?;
    } else {
        match &spec.data {
            ChartData::Bars(bars) => draw_bars(&mut out, bars)?,
            ChartData::Points(points) => draw_points(&mut out, points)?,
        }
    }

    if let Some(label) = &spec.x_label {
        write!(
            out,
            r#"<text class="chart__axis-label" x="{x}" y="{y}" text-anchor="middle">{label}</text>"#,
            x = MARGIN_LEFT + plot_width() / 2.0,
            y = HEIGHT - 6.0,
            label = escape_html(label),
        )?;
    }
    if let Some(label) = &spec.y_label {
        write!(
            out,
            r#"<text class="chart__axis-label" x="14" y="{y}" text-anchor="middle" transform="rotate(-90 14 {y})">{label}</text>"#,
            y = MARGIN_TOP + plot_height() / 2.0,
            label = escape_html(label),
        )?;
    }

    out.push_str("</svg>");
    Ok(out)
}

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

/// Linear map of `[lo, hi]` onto `[0, 1]`, with a degenerate range widened by one unit.
fn domain(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}

fn draw_bars(out: &mut String, bars: &[Bar]) -> anyhow::Result<()> {
    let (lo, hi) = domain(bars.iter().map(|b| b.value), true);
    let y_of = |v: f64| MARGIN_TOP + (hi - v) / (hi - lo) * plot_height();
    let slot = plot_width() / bars.len() as f64;
    let zero = y_of(0.0);

    write!(
        out,
        r#"<line class="chart__baseline" x1="{MARGIN_LEFT}" y1="{zero:.1}" x2="{x2}" y2="{zero:.1}"/>"#,
        x2 = WIDTH - MARGIN_RIGHT,
    )?;

    for (i, bar) in bars.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + slot * 0.1;
        let width = slot * 0.8;
        let top = y_of(bar.value.max(0.0));
        let bottom = y_of(bar.value.min(0.0));
        let class = if bar.value < 0.0 {
            "chart__bar chart__bar--negative"
        } else {
            "chart__bar"
        };
        write!(
            out,
            r#"<rect class="{class}" x="{x:.1}" y="{top:.1}" width="{width:.1}" height="{h:.1}"><title>{label}: {value:.2}</title></rect>"#,
            h = (bottom - top).max(0.5),
            label = escape_html(&bar.label),
            value = bar.value,
        )?;
        write!(
            out,
            r#"<text class="chart__tick" x="{cx:.1}" y="{y:.1}" text-anchor="middle">{label}</text>"#,
            cx = x + width / 2.0,
            y = HEIGHT - MARGIN_BOTTOM + 14.0,
            label = escape_html(&bar.label),
        )?;
    }

    write_y_ticks(out, lo, hi)
}

fn draw_points(out: &mut String, points: &[Point]) -> anyhow::Result<()> {
    let (x_lo, x_hi) = domain(points.iter().map(|p| p.x), false);
    let (y_lo, y_hi) = domain(points.iter().map(|p| p.y), false);
    let x_of = |v: f64| MARGIN_LEFT + (v - x_lo) / (x_hi - x_lo) * plot_width();
    let y_of = |v: f64| MARGIN_TOP + (y_hi - v) / (y_hi - y_lo) * plot_height();

    for point in points {
        let (cx, cy) = (x_of(point.x), y_of(point.y));
        write!(
            out,
            r#"<circle class="chart__point" cx="{cx:.1}" cy="{cy:.1}" r="4"><title>{label}: ({x:.2}, {y:.2})</title></circle>"#,
            label = escape_html(&point.label),
            x = point.x,
            y = point.y,
        )?;
        write!(
            out,
            r#"<text class="chart__point-label" x="{x:.1}" y="{y:.1}">{label}</text>"#,
            x = cx + 6.0,
            y = cy - 6.0,
            label = escape_html(&point.label),
        )?;
    }

    write_y_ticks(out, y_lo, y_hi)
}

fn write_y_ticks(out: &mut String, lo: f64, hi: f64) -> anyhow::Result<()> {
    for (value, y) in [(hi, MARGIN_TOP), (lo, MARGIN_TOP + plot_height())] {
        write!(
            out,
            r#"<text class="chart__tick" x="{x}" y="{y:.1}" text-anchor="end">{value:.2}</text>"#,
            x = MARGIN_LEFT - 6.0,
        )?;
    }
    Ok(())
}
