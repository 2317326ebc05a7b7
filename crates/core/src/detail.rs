use crate::domain::report::{CompanyDetail, CompanyMetric, Report};
use crate::format;

pub const EMPTY_STATE: &str = "This company is not part of the current report.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl DetailField {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView<'a> {
    Found {
        row: &'a CompanyMetric,
        fields: Vec<DetailField>,
    },
    NotFound {
        ticker: String,
    },
}

impl DetailView<'_> {
    pub fn field(&self, label: &str) -> Option<&str> {
        match self {
            DetailView::Found { fields, .. } => fields
                .iter()
                .find(|f| f.label == label)
                .map(|f| f.value.as_str()),
            DetailView::NotFound { .. } => None,
        }
    }
}

/// Synchronous lookup in an already-fetched report. A miss is an empty state, not an error.
pub fn select<'a>(report: &'a Report, ticker: &str) -> DetailView<'a> {
    match report.find(ticker) {
        Some(row) => DetailView::Found {
            row,
            fields: row_fields(row),
        },
        None => DetailView::NotFound {
            ticker: ticker.trim().to_string(),
        },
    }
}

pub fn row_fields(row: &CompanyMetric) -> Vec<DetailField> {
    vec![
        DetailField::new("Combined score", format::format_number(row.combined_score, 2)),
        DetailField::new("EVA", format::format_percent(row.eva_percentual)),
        DetailField::new("EFV", format::format_percent(row.efv_percentual)),
        DetailField::new("Upside", format::format_percent(row.upside_percentual)),
        DetailField::new("WACC", format::format_percent(row.wacc_percentual)),
        DetailField::new("Market cap", format::format_currency(row.market_cap)),
        DetailField::new("Stock price", format::format_price(row.stock_price)),
        DetailField::new("Current wealth", format::format_currency(row.riqueza_atual)),
        DetailField::new("Future wealth", format::format_currency(row.riqueza_futura)),
    ]
}

/// Fields for the per-ticker endpoint, which also carries absolute EVA/EFV.
pub fn company_detail_fields(detail: &CompanyDetail) -> Vec<DetailField> {
    let m = &detail.metrics;
    vec![
        DetailField::new("EVA", format::format_percent(m.eva_percentual)),
        DetailField::new("EVA (absolute)", format::format_currency(m.eva_abs)),
        DetailField::new("EFV", format::format_percent(m.efv_percentual)),
        DetailField::new("EFV (absolute)", format::format_currency(m.efv_abs)),
        DetailField::new("Upside", format::format_percent(m.upside_percentual)),
        DetailField::new("WACC", format::format_percent(m.wacc_percentual)),
        DetailField::new("Market cap", format::format_currency(m.market_cap)),
        DetailField::new("Stock price", format::format_price(m.stock_price)),
        DetailField::new("Current wealth", format::format_currency(m.riqueza_atual)),
        DetailField::new("Future wealth", format::format_currency(m.riqueza_futura)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::fixtures::{report, row};
    use crate::domain::report::CompanyDetailMetrics;

    #[test]
    fn selected_company_shows_two_decimal_score() {
        let report = report(vec![row("VALE3.SA", Some(1.0)), row("PETR4.SA", Some(0.8765))]);
        let view = select(&report, "PETR4.SA");
        assert_eq!(view.field("Combined score"), Some("0.88"));
    }

    #[test]
    fn null_score_shows_not_available() {
        let report = report(vec![row("PETR4.SA", None)]);
        assert_eq!(select(&report, "PETR4.SA").field("Combined score"), Some("N/A"));
    }

    #[test]
    fn missing_ticker_is_an_empty_state() {
        let report = report(vec![row("PETR4.SA", Some(1.0))]);
        assert_eq!(
            select(&report, " MGLU3.SA "),
            DetailView::NotFound {
                ticker: "MGLU3.SA".to_string()
            }
        );
    }

    #[test]
    fn endpoint_detail_includes_absolute_values() {
        let detail = CompanyDetail {
            ticker: "VALE3.SA".into(),
            company_name: "Vale".into(),
            metrics: CompanyDetailMetrics {
                eva_abs: Some(2_500_000_000.0),
                ..Default::default()
            },
        };
        let fields = company_detail_fields(&detail);
        let eva_abs = fields.iter().find(|f| f.label == "EVA (absolute)").unwrap();
        assert_eq!(eva_abs.value, "R$ 2.50B");
    }
}
