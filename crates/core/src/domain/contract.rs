use crate::domain::report::{CompanyMetric, Report, SummaryStatistics};
use anyhow::{bail, ensure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Report payload exactly as the backend sends it. Every field is optional on the wire;
/// `validate_and_into_report` decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub total_companies_analyzed: Option<usize>,
    #[serde(default)]
    pub summary_statistics: Option<WireSummaryStatistics>,
    #[serde(default)]
    pub full_ranking_data: Option<Vec<WireCompanyMetric>>,
    /// Row key used by fresh analysis runs.
    #[serde(default)]
    pub full_report_data: Option<Vec<WireCompanyMetric>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireSummaryStatistics {
    #[serde(default)]
    pub positive_eva_count: Option<usize>,
    #[serde(default)]
    pub positive_efv_count: Option<usize>,
    #[serde(default)]
    pub average_upside: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireCompanyMetric {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub combined_score: Option<f64>,
    #[serde(default)]
    pub eva_percentual: Option<f64>,
    #[serde(default)]
    pub efv_percentual: Option<f64>,
    #[serde(default)]
    pub upside_percentual: Option<f64>,
    #[serde(default)]
    pub wacc_percentual: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub stock_price: Option<f64>,
    #[serde(default)]
    pub riqueza_atual: Option<f64>,
    #[serde(default)]
    pub riqueza_futura: Option<f64>,
}

impl WireReport {
    pub fn validate_and_into_report(self) -> anyhow::Result<Report> {
        if self.status.as_deref() == Some("error") {
            let message = self
                .message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "backend reported an error without a message".to_string());
            bail!(message);
        }

        let Some(raw_rows) = self.full_ranking_data else {
            bail!("report payload is missing full_ranking_data");
        };

        let mut seen = BTreeSet::<String>::new();
        let mut rows = Vec::with_capacity(raw_rows.len());
        for (idx, raw) in raw_rows.into_iter().enumerate() {
            rows.push(raw.validate_and_into_row(idx, &mut seen)?);
        }

        let derived = SummaryStatistics::derive(&rows);
        let summary = match self.summary_statistics {
            Some(wire) => SummaryStatistics {
                positive_eva_count: wire.positive_eva_count.unwrap_or(derived.positive_eva_count),
                positive_efv_count: wire.positive_efv_count.unwrap_or(derived.positive_efv_count),
                average_upside: wire
                    .average_upside
                    .filter(|v| v.is_finite())
                    .or(derived.average_upside),
            },
            None => derived,
        };

        Ok(Report {
            timestamp: self.timestamp.unwrap_or_default(),
            total_companies_analyzed: self.total_companies_analyzed.unwrap_or(rows.len()),
            summary,
            rows,
        })
    }
}

impl WireCompanyMetric {
    fn validate_and_into_row(
        self,
        idx: usize,
        seen_tickers: &mut BTreeSet<String>,
    ) -> anyhow::Result<CompanyMetric> {
        let ticker = self.ticker.unwrap_or_default().trim().to_string();
        ensure!(!ticker.is_empty(), "row {idx} has an empty ticker");
        ensure!(
            seen_tickers.insert(ticker.to_ascii_uppercase()),
            "duplicate ticker in report: {ticker}"
        );

        let company_name = self
            .company_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ticker.clone());

        Ok(CompanyMetric {
            ticker,
            company_name,
            combined_score: finite(self.combined_score),
            eva_percentual: finite(self.eva_percentual),
            efv_percentual: finite(self.efv_percentual),
            upside_percentual: finite(self.upside_percentual),
            wacc_percentual: finite(self.wacc_percentual),
            market_cap: finite(self.market_cap),
            stock_price: finite(self.stock_price),
            riqueza_atual: finite(self.riqueza_atual),
            riqueza_futura: finite(self.riqueza_futura),
        })
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn parse_wire(text: &str) -> anyhow::Result<WireReport> {
    serde_json::from_str::<WireReport>(text)
        .map_err(|e| anyhow::anyhow!("report payload is not valid JSON: {e}"))
}

/// Stored ranking payload. Rows must be under `full_ranking_data`.
pub fn parse_report(text: &str) -> anyhow::Result<Report> {
    parse_wire(text)?.validate_and_into_report()
}

/// Payload of a fresh analysis run, which may carry its rows under `full_report_data`.
pub fn parse_analysis_report(text: &str) -> anyhow::Result<Report> {
    let mut wire = parse_wire(text)?;
    if wire.full_ranking_data.is_none() {
        wire.full_ranking_data = wire.full_report_data.take();
    }
    wire.validate_and_into_report()
}
