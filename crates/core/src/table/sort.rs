use crate::domain::report::CompanyMetric;
use crate::format;
use anyhow::bail;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Ticker,
    CompanyName,
    CombinedScore,
    EvaPercentual,
    EfvPercentual,
    UpsidePercentual,
    WaccPercentual,
    MarketCap,
    StockPrice,
    RiquezaAtual,
    RiquezaFutura,
}

impl SortKey {
    /// Table columns in display order.
    pub const ALL: [SortKey; 11] = [
        SortKey::Ticker,
        SortKey::CompanyName,
        SortKey::CombinedScore,
        SortKey::EvaPercentual,
        SortKey::EfvPercentual,
        SortKey::UpsidePercentual,
        SortKey::WaccPercentual,
        SortKey::MarketCap,
        SortKey::StockPrice,
        SortKey::RiquezaAtual,
        SortKey::RiquezaFutura,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Ticker => "ticker",
            SortKey::CompanyName => "company_name",
            SortKey::CombinedScore => "combined_score",
            SortKey::EvaPercentual => "eva_percentual",
            SortKey::EfvPercentual => "efv_percentual",
            SortKey::UpsidePercentual => "upside_percentual",
            SortKey::WaccPercentual => "wacc_percentual",
            SortKey::MarketCap => "market_cap",
            SortKey::StockPrice => "stock_price",
            SortKey::RiquezaAtual => "riqueza_atual",
            SortKey::RiquezaFutura => "riqueza_futura",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Ticker => "Ticker",
            SortKey::CompanyName => "Company",
            SortKey::CombinedScore => "Score",
            SortKey::EvaPercentual => "EVA %",
            SortKey::EfvPercentual => "EFV %",
            SortKey::UpsidePercentual => "Upside %",
            SortKey::WaccPercentual => "WACC %",
            SortKey::MarketCap => "Market cap",
            SortKey::StockPrice => "Price",
            SortKey::RiquezaAtual => "Current wealth",
            SortKey::RiquezaFutura => "Future wealth",
        }
    }

    pub fn value(self, row: &CompanyMetric) -> Option<SortValue<'_>> {
        let number = |v: Option<f64>| v.filter(|x| x.is_finite()).map(SortValue::Number);
        match self {
            SortKey::Ticker => Some(SortValue::Text(&row.ticker)),
            SortKey::CompanyName => Some(SortValue::Text(&row.company_name)),
            SortKey::CombinedScore => number(row.combined_score),
            SortKey::EvaPercentual => number(row.eva_percentual),
            SortKey::EfvPercentual => number(row.efv_percentual),
            SortKey::UpsidePercentual => number(row.upside_percentual),
            SortKey::WaccPercentual => number(row.wacc_percentual),
            SortKey::MarketCap => number(row.market_cap),
            SortKey::StockPrice => number(row.stock_price),
            SortKey::RiquezaAtual => number(row.riqueza_atual),
            SortKey::RiquezaFutura => number(row.riqueza_futura),
        }
    }

    /// Cell text for this column.
    pub fn display(self, row: &CompanyMetric) -> String {
        match self {
            SortKey::Ticker => row.ticker.clone(),
            SortKey::CompanyName => row.company_name.clone(),
            SortKey::CombinedScore => format::format_number(row.combined_score, 2),
            SortKey::EvaPercentual => format::format_percent(row.eva_percentual),
            SortKey::EfvPercentual => format::format_percent(row.efv_percentual),
            SortKey::UpsidePercentual => format::format_percent(row.upside_percentual),
            SortKey::WaccPercentual => format::format_percent(row.wacc_percentual),
            SortKey::MarketCap => format::format_currency(row.market_cap),
            SortKey::StockPrice => format::format_price(row.stock_price),
            SortKey::RiquezaAtual => format::format_currency(row.riqueza_atual),
            SortKey::RiquezaFutura => format::format_currency(row.riqueza_futura),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        match SortKey::ALL.iter().find(|k| k.as_str() == wanted) {
            Some(k) => Ok(*k),
            None => bail!("unknown sort column: {wanted}"),
        }
    }
}

/// A cell value as seen by the sorter; the variant decides string vs numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // Mixed columns cannot come out of a typed row; order numbers first all the same.
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => bail!("unknown sort direction: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::CombinedScore,
            direction: SortDirection::Descending,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Header click: a new column starts descending, the current column flips.
    pub fn click(self, key: SortKey) -> Self {
        if key == self.key {
            Self {
                key,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                key,
                direction: SortDirection::Descending,
            }
        }
    }
}

/// Projects `rows` into display order without touching the source slice.
///
/// Rows without a value for the key trail the result in either direction, and equal
/// values keep their original relative order.
pub fn sorted_rows<'a>(rows: &'a [CompanyMetric], config: &SortConfig) -> Vec<&'a CompanyMetric> {
    let mut keyed: Vec<(SortValue<'a>, &'a CompanyMetric)> = Vec::with_capacity(rows.len());
    let mut missing: Vec<&'a CompanyMetric> = Vec::new();

    for row in rows {
        match config.key.value(row) {
            Some(v) => keyed.push((v, row)),
            None => missing.push(row),
        }
    }

    keyed.sort_by(|(a, _), (b, _)| match config.direction {
        SortDirection::Ascending => a.compare(b),
        SortDirection::Descending => b.compare(a),
    });

    keyed
        .into_iter()
        .map(|(_, row)| row)
        .chain(missing)
        .collect()
}
