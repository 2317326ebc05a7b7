use crate::chart::{Bar, ChartData, ChartSpec, Point, Surface, SurfaceFactory};

const BAR_WIDTH: usize = 40;
const GRID_WIDTH: usize = 48;
const GRID_HEIGHT: usize = 14;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSurfaceFactory;

impl SurfaceFactory for TextSurfaceFactory {
    type Surface = TextSurface;

    fn create(&self, _chart_id: &str) -> anyhow::Result<TextSurface> {
        Ok(TextSurface { lines: Vec::new() })
    }
}

/// Fixed-width rendering for terminals.
#[derive(Debug)]
pub struct TextSurface {
    lines: Vec<String>,
}

impl TextSurface {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Surface for TextSurface {
    fn draw(&mut self, spec: &ChartSpec) -> anyhow::Result<()> {
        self.lines = render_text(spec);
        Ok(())
    }

    fn dispose(&mut self) {
        self.lines.clear();
    }
}

pub fn render_text(spec: &ChartSpec) -> Vec<String> {
    let mut lines = vec![spec.title.clone(), "-".repeat(spec.title.chars().count())];
    if spec.is_empty() {
        lines.push("(no data)".to_string());
        return lines;
    }
    match &spec.data {
        ChartData::Bars(bars) => lines.extend(bar_lines(bars)),
        ChartData::Points(points) => {
            lines.extend(grid_lines(points));
            if let (Some(x), Some(y)) = (&spec.x_label, &spec.y_label) {
                lines.push(format!("x: {x}  y: {y}"));
            }
        }
    }
    lines
}

fn bar_lines(bars: &[Bar]) -> Vec<String> {
    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let peak = bars.iter().map(|b| b.value.abs()).fold(0.0_f64, f64::max);

    bars.iter()
        .map(|bar| {
            let len = if peak > 0.0 {
                ((bar.value.abs() / peak) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let glyph = if bar.value < 0.0 { '-' } else { '#' };
            let body: String = std::iter::repeat(glyph).take(len).collect();
            format!(
                "{label:<label_width$} | {body:<BAR_WIDTH$} {value:.2}",
                label = bar.label,
                value = bar.value,
            )
        })
        .collect()
}

fn grid_lines(points: &[Point]) -> Vec<String> {
    let bounds = |vals: Vec<f64>| {
        let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (hi - lo).abs() < f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    };
    let (x_lo, x_hi) = bounds(points.iter().map(|p| p.x).collect());
    let (y_lo, y_hi) = bounds(points.iter().map(|p| p.y).collect());

    let mut grid = vec![vec![' '; GRID_WIDTH]; GRID_HEIGHT];
    for p in points {
        let col = ((p.x - x_lo) / (x_hi - x_lo) * (GRID_WIDTH - 1) as f64).round() as usize;
        let row = ((y_hi - p.y) / (y_hi - y_lo) * (GRID_HEIGHT - 1) as f64).round() as usize;
        let cell = &mut grid[row.min(GRID_HEIGHT - 1)][col.min(GRID_WIDTH - 1)];
        *cell = if *cell == ' ' { '*' } else { '@' };
    }

    let mut lines = Vec::with_capacity(GRID_HEIGHT + 2);
    for (i, row) in grid.into_iter().enumerate() {
        let axis = match i {
            0 => format!("{y_hi:>8.2}"),
            i if i == GRID_HEIGHT - 1 => format!("{y_lo:>8.2}"),
            _ => " ".repeat(8),
        };
        lines.push(format!("{axis} |{}", row.into_iter().collect::<String>()));
    }
    lines.push(format!("{} +{}", " ".repeat(8), "-".repeat(GRID_WIDTH)));
    lines.push(format!(
        "{} {x_lo:<half$.2}{x_hi:>half$.2}",
        " ".repeat(9),
        half = GRID_WIDTH / 2,
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::testing::bars;

    #[test]
    fn bars_scale_to_the_largest_magnitude() {
        let lines = render_text(&bars(&[2.0, 1.0, -2.0]));
        assert_eq!(lines[0], "test");
        assert!(lines[2].contains(&"#".repeat(BAR_WIDTH)));
        assert!(lines[3].contains(&"#".repeat(BAR_WIDTH / 2)));
        assert!(!lines[3].contains(&"#".repeat(BAR_WIDTH / 2 + 1)));
        assert!(lines[4].contains(&"-".repeat(BAR_WIDTH)));
        assert!(lines[4].ends_with("-2.00"));
    }

    #[test]
    fn scatter_places_every_point() {
        let spec = ChartSpec {
            data: ChartData::Points(vec![
                Point { label: "A".into(), x: 0.0, y: 0.0 },
                Point { label: "B".into(), x: 10.0, y: 5.0 },
            ]),
            x_label: Some("EVA %".into()),
            y_label: Some("EFV %".into()),
            ..bars(&[])
        };
        let lines = render_text(&spec);
        let stars: usize = lines.iter().map(|l| l.matches('*').count()).sum();
        assert_eq!(stars, 2);
        assert_eq!(lines.last().map(String::as_str), Some("x: EVA %  y: EFV %"));
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        assert_eq!(render_text(&bars(&[]))[2], "(no data)");
    }
}
