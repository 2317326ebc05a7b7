use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One valuation report as produced by the backend. Replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub total_companies_analyzed: usize,
    pub summary: SummaryStatistics,
    pub rows: Vec<CompanyMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub positive_eva_count: usize,
    pub positive_efv_count: usize,
    pub average_upside: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetric {
    pub ticker: String,
    pub company_name: String,
    pub combined_score: Option<f64>,
    pub eva_percentual: Option<f64>,
    pub efv_percentual: Option<f64>,
    pub upside_percentual: Option<f64>,
    pub wacc_percentual: Option<f64>,
    pub market_cap: Option<f64>,
    pub stock_price: Option<f64>,
    pub riqueza_atual: Option<f64>,
    pub riqueza_futura: Option<f64>,
}

impl Report {
    pub fn find(&self, ticker: &str) -> Option<&CompanyMetric> {
        let wanted = ticker.trim();
        if wanted.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .find(|row| row.ticker.eq_ignore_ascii_case(wanted))
            .or_else(|| {
                // Bare B3 symbols ("PETR4") match their Yahoo-style form ("PETR4.SA").
                self.rows.iter().find(|row| {
                    row.ticker
                        .to_ascii_uppercase()
                        .strip_suffix(".SA")
                        .is_some_and(|bare| bare.eq_ignore_ascii_case(wanted))
                })
            })
    }
}

impl SummaryStatistics {
    pub fn derive(rows: &[CompanyMetric]) -> Self {
        let positive_eva_count = rows
            .iter()
            .filter(|r| r.eva_percentual.is_some_and(|v| v > 0.0))
            .count();
        let positive_efv_count = rows
            .iter()
            .filter(|r| r.efv_percentual.is_some_and(|v| v > 0.0))
            .count();

        let upsides: Vec<f64> = rows.iter().filter_map(|r| r.upside_percentual).collect();
        let average_upside = if upsides.is_empty() {
            None
        } else {
            Some(upsides.iter().sum::<f64>() / upsides.len() as f64)
        };

        Self {
            positive_eva_count,
            positive_efv_count,
            average_upside,
        }
    }
}

/// Per-ticker analysis served by the company endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    pub ticker: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub metrics: CompanyDetailMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetailMetrics {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub stock_price: Option<f64>,
    #[serde(default)]
    pub wacc_percentual: Option<f64>,
    #[serde(default)]
    pub eva_abs: Option<f64>,
    #[serde(default)]
    pub eva_percentual: Option<f64>,
    #[serde(default)]
    pub efv_abs: Option<f64>,
    #[serde(default)]
    pub efv_percentual: Option<f64>,
    #[serde(default)]
    pub riqueza_atual: Option<f64>,
    #[serde(default)]
    pub riqueza_futura: Option<f64>,
    #[serde(default)]
    pub upside_percentual: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyListing {
    pub ticker: String,
    pub ticker_clean: String,
}

/// Sector name to member tickers, as served by the market sectors endpoint.
pub type SectorMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::{report, row};
    use super::*;

    #[test]
    fn find_matches_case_insensitively_and_bare_symbols() {
        let report = report(vec![row("PETR4.SA", Some(1.0)), row("VALE3.SA", None)]);
        assert_eq!(report.find("petr4.sa").map(|r| r.ticker.as_str()), Some("PETR4.SA"));
        assert_eq!(report.find("VALE3").map(|r| r.ticker.as_str()), Some("VALE3.SA"));
        assert!(report.find("ITUB4").is_none());
        assert!(report.find("  ").is_none());
    }

    #[test]
    fn derive_summary_ignores_nulls() {
        let mut a = row("A", None);
        a.eva_percentual = Some(2.0);
        a.efv_percentual = Some(-1.0);
        a.upside_percentual = Some(10.0);
        let mut b = row("B", None);
        b.eva_percentual = Some(-3.0);
        b.efv_percentual = Some(4.0);
        b.upside_percentual = Some(30.0);
        let c = row("C", None);

        let s = SummaryStatistics::derive(&[a, b, c]);
        assert_eq!(s.positive_eva_count, 1);
        assert_eq!(s.positive_efv_count, 1);
        assert_eq!(s.average_upside, Some(20.0));
    }

    #[test]
    fn derive_summary_without_upside_is_none() {
        let s = SummaryStatistics::derive(&[row("A", Some(1.0))]);
        assert_eq!(s.average_upside, None);
    }
}
