use ibovdash_core::chart::report::{dashboard_charts, DEFAULT_TOP_N};
use ibovdash_core::chart::text::TextSurfaceFactory;
use ibovdash_core::chart::ChartBoard;
use ibovdash_core::dashboard::summary_cards;
use ibovdash_core::detail::DetailField;
use ibovdash_core::domain::report::{Report, SectorMap};
use ibovdash_core::table::{sorted_rows, SortConfig, SortDirection, SortKey};

pub fn cards(report: &Report) -> Vec<String> {
    let cards = summary_cards(report);
    let width = cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
    cards
        .into_iter()
        .map(|c| format!("{:<width$}  {}", c.label, c.value))
        .collect()
}

/// Fixed-width ranking table in display order. `limit` caps the printed rows only.
pub fn ranking_table(report: &Report, sort: &SortConfig, limit: Option<usize>) -> Vec<String> {
    let rows = sorted_rows(&report.rows, sort);
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    let header: Vec<String> = SortKey::ALL
        .iter()
        .map(|key| {
            let marker = match (*key == sort.key, sort.direction) {
                (true, SortDirection::Descending) => " v",
                (true, SortDirection::Ascending) => " ^",
                (false, _) => "",
            };
            format!("{}{marker}", key.label())
        })
        .collect();

    let cells: Vec<Vec<String>> = rows[..shown]
        .iter()
        .map(|row| SortKey::ALL.iter().map(|key| key.display(row)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(join_padded(&header, &widths));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for line in &cells {
        out.push(join_padded(line, &widths));
    }
    if shown < rows.len() {
        out.push(format!("... {} more", rows.len() - shown));
    }
    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            // Ticker and company name read left-aligned, the metric columns right-aligned.
            if i < 2 {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Draws the dashboard charts onto text surfaces. The board is dropped on return, which
/// disposes every surface it mounted.
pub fn charts(report: &Report) -> anyhow::Result<Vec<String>> {
    let mut board = ChartBoard::new(TextSurfaceFactory);
    let mut out = Vec::new();
    for (chart_id, spec) in dashboard_charts(report, DEFAULT_TOP_N) {
        board.mount(chart_id, spec)?;
        if let Some(surface) = board.surface(chart_id) {
            out.extend(surface.lines().iter().cloned());
            out.push(String::new());
        }
    }
    Ok(out)
}

pub fn fields(fields: &[DetailField]) -> Vec<String> {
    let width = fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|f| format!("{:<width$}  {}", f.label, f.value))
        .collect()
}

pub fn sectors(sectors: &SectorMap) -> Vec<String> {
    let mut out: Vec<String> = sectors
        .iter()
        .map(|(sector, tickers)| format!("{sector} ({}): {}", tickers.len(), tickers.join(", ")))
        .collect();
    out.push(format!("{} sectors", sectors.len()));
    out
}
