use crate::chart::{Bar, ChartData, ChartSpec, Point};
use crate::domain::report::{CompanyMetric, Report};
use crate::table::{sorted_rows, SortConfig, SortDirection, SortKey};

pub const TOP_SCORES_CHART: &str = "top-scores";
pub const TOP_UPSIDE_CHART: &str = "top-upside";
pub const EVA_VS_EFV_CHART: &str = "eva-vs-efv";

pub const DEFAULT_TOP_N: usize = 10;

/// The dashboard's charts for one report, keyed by chart identity.
pub fn dashboard_charts(report: &Report, top_n: usize) -> Vec<(&'static str, ChartSpec)> {
    vec![
        (TOP_SCORES_CHART, top_scores(report, top_n)),
        (TOP_UPSIDE_CHART, top_upside(report, top_n)),
        (EVA_VS_EFV_CHART, eva_vs_efv(report)),
    ]
}

pub fn top_scores(report: &Report, top_n: usize) -> ChartSpec {
    ChartSpec {
        title: format!("Top {top_n} by combined score"),
        x_label: None,
        y_label: Some("Score".to_string()),
        data: ChartData::Bars(top_bars(&report.rows, SortKey::CombinedScore, top_n, |r| {
            r.combined_score
        })),
    }
}

pub fn top_upside(report: &Report, top_n: usize) -> ChartSpec {
    ChartSpec {
        title: format!("Top {top_n} by upside"),
        x_label: None,
        y_label: Some("Upside %".to_string()),
        data: ChartData::Bars(top_bars(&report.rows, SortKey::UpsidePercentual, top_n, |r| {
            r.upside_percentual
        })),
    }
}

pub fn eva_vs_efv(report: &Report) -> ChartSpec {
    let points = report
        .rows
        .iter()
        .filter_map(|row| match (row.eva_percentual, row.efv_percentual) {
            (Some(x), Some(y)) => Some(Point {
                label: short_ticker(&row.ticker).to_string(),
                x,
                y,
            }),
            _ => None,
        })
        .collect();

    ChartSpec {
        title: "EVA % vs EFV %".to_string(),
        x_label: Some("EVA %".to_string()),
        y_label: Some("EFV %".to_string()),
        data: ChartData::Points(points),
    }
}

fn top_bars(
    rows: &[CompanyMetric],
    key: SortKey,
    top_n: usize,
    value: impl Fn(&CompanyMetric) -> Option<f64>,
) -> Vec<Bar> {
    sorted_rows(rows, &SortConfig::new(key, SortDirection::Descending))
        .into_iter()
        .filter_map(|row| {
            value(row).map(|v| Bar {
                label: short_ticker(&row.ticker).to_string(),
                value: v,
            })
        })
        .take(top_n)
        .collect()
}

fn short_ticker(ticker: &str) -> &str {
    ticker.strip_suffix(".SA").unwrap_or(ticker)
}
