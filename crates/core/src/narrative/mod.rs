pub mod error;
pub mod gemini;

use crate::domain::report::CompanyMetric;
use crate::format;

pub use error::NarrativeError;

#[async_trait::async_trait]
pub trait NarrativeClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Returns the raw narrative text for one company.
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}

pub fn company_prompt(row: &CompanyMetric) -> String {
    format!(
        "Você é um analista financeiro. Escreva um resumo curto (até 3 parágrafos) sobre a \
empresa {name} ({ticker}) para um investidor, com base nas métricas abaixo. Destaque \
geração de valor atual (EVA), futura (EFV) e o upside estimado.\n\n\
- Score combinado: {score}\n\
- EVA: {eva}\n\
- EFV: {efv}\n\
- Upside: {upside}\n\
- WACC: {wacc}\n\
- Valor de mercado: {market_cap}\n\
- Preço da ação: {price}\n\
- Riqueza atual: {riqueza_atual}\n\
- Riqueza futura: {riqueza_futura}",
        name = row.company_name,
        ticker = row.ticker,
        score = format::format_number(row.combined_score, 2),
        eva = format::format_percent(row.eva_percentual),
        efv = format::format_percent(row.efv_percentual),
        upside = format::format_percent(row.upside_percentual),
        wacc = format::format_percent(row.wacc_percentual),
        market_cap = format::format_currency(row.market_cap),
        price = format::format_price(row.stock_price),
        riqueza_atual = format::format_currency(row.riqueza_atual),
        riqueza_futura = format::format_currency(row.riqueza_futura),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::fixtures::row;

    #[test]
    fn prompt_carries_formatted_metrics() {
        let mut r = row("PETR4.SA", Some(0.876));
        r.market_cap = Some(2.5e9);
        let prompt = company_prompt(&r);
        assert!(prompt.contains("PETR4.SA S.A. (PETR4.SA)"));
        assert!(prompt.contains("Score combinado: 0.88"));
        assert!(prompt.contains("Valor de mercado: R$ 2.50B"));
        assert!(prompt.contains("EVA: N/A"));
    }
}
