use crate::api::error::ApiError;
use crate::api::ReportSource;
use crate::config::Settings;
use crate::domain::contract;
use crate::domain::report::{CompanyDetail, CompanyListing, HealthStatus, Report, SectorMap};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5001";
// Full analyses walk every Ibovespa constituent upstream.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub ranking: String,
    pub analysis: String,
    pub company: String,
    pub companies: String,
    pub sectors: String,
    pub health: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            ranking: "/api/v1/ranking/full".to_string(),
            analysis: "/api/v1/complete".to_string(),
            company: "/api/v1/company".to_string(),
            companies: "/api/v1/companies".to_string(),
            sectors: "/api/v1/market/sectors".to_string(),
            health: "/api/v1/health".to_string(),
        }
    }
}

impl ApiPaths {
    pub fn from_env() -> Self {
        let mut out = Self::default();
        let overrides = [
            ("RANKING_PATH", &mut out.ranking),
            ("ANALYSIS_PATH", &mut out.analysis),
            ("COMPANY_PATH", &mut out.company),
            ("COMPANIES_PATH", &mut out.companies),
            ("SECTORS_PATH", &mut out.sectors),
            ("HEALTH_PATH", &mut out.health),
        ];
        for (var, slot) in overrides {
            if let Some(v) = std::env::var(var).ok().filter(|s| !s.trim().is_empty()) {
                *slot = v.trim().to_string();
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct HttpReportClient {
    http: reqwest::Client,
    base_url: String,
    paths: ApiPaths,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest {
    num_companies: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompaniesResponse {
    #[serde(default)]
    companies: Vec<CompanyListing>,
}

#[derive(Debug, Deserialize)]
struct SectorsResponse {
    #[serde(default)]
    sectors: SectorMap,
}

impl HttpReportClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, ApiPaths::from_env(), Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: impl Into<String>, paths: ApiPaths, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build report http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            paths,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Company endpoint with the ticker as one percent-encoded path segment.
    fn company_url(&self, ticker: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.url(&self.paths.company))
            .map_err(|e| ApiError::Application(format!("invalid company url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Application("company url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(ticker);
        Ok(url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, "analysis server returned an error status");
            return Err(ApiError::from_response(status, &text));
        }
        Ok(text)
    }

    fn decode<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, ApiError> {
        serde_json::from_str::<T>(text)
            .map_err(|e| ApiError::Application(format!("malformed {what} payload: {e}")))
    }

    fn decode_report(
        text: &str,
        parse: fn(&str) -> anyhow::Result<Report>,
    ) -> Result<Report, ApiError> {
        let report = parse(text).map_err(|e| ApiError::Application(e.to_string()))?;
        tracing::info!(
            rows = report.rows.len(),
            analyzed = report.total_companies_analyzed,
            "report received"
        );
        Ok(report)
    }
}

#[async_trait::async_trait]
impl ReportSource for HttpReportClient {
    async fn fetch_ranking(&self) -> Result<Report, ApiError> {
        let text = self.send(self.http.get(self.url(&self.paths.ranking))).await?;
        Self::decode_report(&text, contract::parse_report)
    }

    async fn run_analysis(&self, num_companies: Option<u32>) -> Result<Report, ApiError> {
        tracing::info!(?num_companies, "requesting analysis run");
        let req = self
            .http
            .post(self.url(&self.paths.analysis))
            .json(&AnalysisRequest { num_companies });
        let text = self.send(req).await?;
        Self::decode_report(&text, contract::parse_analysis_report)
    }

    async fn fetch_company(&self, ticker: &str) -> Result<CompanyDetail, ApiError> {
        let ticker = ticker.trim();
        if ticker.is_empty() || ticker == "." || ticker == ".." {
            return Err(ApiError::Application(format!("invalid ticker: {ticker:?}")));
        }
        let text = self.send(self.http.get(self.company_url(ticker)?)).await?;
        let detail: CompanyDetail = Self::decode(&text, "company")?;
        if detail.ticker.trim().is_empty() {
            return Err(ApiError::Application(
                "malformed company payload: empty ticker".to_string(),
            ));
        }
        Ok(detail)
    }

    async fn list_companies(&self) -> Result<Vec<CompanyListing>, ApiError> {
        let text = self.send(self.http.get(self.url(&self.paths.companies))).await?;
        let parsed: CompaniesResponse = Self::decode(&text, "company list")?;
        Ok(parsed.companies)
    }

    async fn list_sectors(&self) -> Result<SectorMap, ApiError> {
        let text = self.send(self.http.get(self.url(&self.paths.sectors))).await?;
        let parsed: SectorsResponse = Self::decode(&text, "sector list")?;
        Ok(parsed.sectors)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let text = self.send(self.http.get(self.url(&self.paths.health))).await?;
        Self::decode(&text, "health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> HttpReportClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpReportClient::new(format!("http://{addr}/"), ApiPaths::default(), Duration::from_secs(5)).unwrap()
    }

    fn report_body() -> Value {
        json!({
            "status": "success",
            "timestamp": "2026-10-14T18:30:00",
            "total_companies_analyzed": 1,
            "summary_statistics": {"positive_eva_count": 1, "positive_efv_count": 1},
            "full_ranking_data": [{"ticker": "PETR4.SA", "company_name": "Petrobras", "combined_score": 0.5}]
        })
    }

    #[tokio::test]
    async fn fetches_ranking() {
        let app = Router::new().route("/api/v1/ranking/full", get(|| async { Json(report_body()) }));
        let client = serve(app).await;
        let report = client.fetch_ranking().await.unwrap();
        assert_eq!(report.rows[0].ticker, "PETR4.SA");
    }

    #[tokio::test]
    async fn analysis_posts_num_companies_including_null() {
        let app = Router::new().route(
            "/api/v1/complete",
            post(|Json(body): Json<Value>| async move {
                let mut report = report_body();
                // Echo the request so the test can see what was sent.
                report["timestamp"] = json!(body["num_companies"].to_string());
                Json(report)
            }),
        );
        let client = serve(app).await;
        assert_eq!(client.run_analysis(Some(5)).await.unwrap().timestamp, "5");
        assert_eq!(client.run_analysis(None).await.unwrap().timestamp, "null");
    }

    #[tokio::test]
    async fn error_status_uses_structured_message() {
        let app = Router::new().route(
            "/api/v1/complete",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error", "message": "Nenhum dado foi coletado para a análise."})),
                )
            }),
        );
        let client = serve(app).await;
        let err = client.run_analysis(None).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: "Nenhum dado foi coletado para a análise.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_report_is_an_application_error() {
        let app = Router::new().route(
            "/api/v1/ranking/full",
            get(|| async { Json(json!({"timestamp": "x", "total_companies_analyzed": 0})) }),
        );
        let client = serve(app).await;
        let err = client.fetch_ranking().await.unwrap_err();
        assert!(matches!(err, ApiError::Application(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn company_detail_and_listing() {
        let app = Router::new()
            .route(
                "/api/v1/company/:ticker",
                get(|Path(ticker): Path<String>| async move {
                    Json(json!({
                        "status": "success",
                        "ticker": ticker,
                        "company_name": "Vale",
                        "metrics": {"eva_abs": 1.5e9, "wacc_percentual": null}
                    }))
                }),
            )
            .route(
                "/api/v1/companies",
                get(|| async {
                    Json(json!({"companies": [{"ticker": "VALE3.SA", "ticker_clean": "VALE3"}], "total": 1}))
                }),
            );
        let client = serve(app).await;

        let detail = client.fetch_company("VALE3.SA").await.unwrap();
        assert_eq!(detail.ticker, "VALE3.SA");
        assert_eq!(detail.metrics.eva_abs, Some(1.5e9));
        assert_eq!(detail.metrics.wacc_percentual, None);

        let listed = client.list_companies().await.unwrap();
        assert_eq!(listed[0].ticker_clean, "VALE3");
    }

    #[tokio::test]
    async fn analysis_accepts_rows_under_full_report_data() {
        let app = Router::new().route(
            "/api/v1/complete",
            post(|| async {
                Json(json!({
                    "status": "success",
                    "timestamp": "2026-10-14T18:30:00",
                    "total_companies_analyzed": 1,
                    "summary_statistics": {"positive_eva_count": 0, "positive_efv_count": 0},
                    "opportunities": {},
                    "full_report_data": [{"ticker": "ITUB4.SA", "combined_score": 0.3}]
                }))
            }),
        );
        let client = serve(app).await;
        let report = client.run_analysis(Some(1)).await.unwrap();
        assert_eq!(report.rows[0].ticker, "ITUB4.SA");
    }

    #[tokio::test]
    async fn ticker_stays_a_single_path_segment() {
        let app = Router::new().route(
            "/api/v1/company/:ticker",
            get(|Path(ticker): Path<String>| async move {
                Json(json!({"ticker": ticker, "company_name": "echo"}))
            }),
        );
        let client = serve(app).await;

        assert_eq!(client.fetch_company("a/../b").await.unwrap().ticker, "a/../b");
        assert_eq!(client.fetch_company("x?y#z").await.unwrap().ticker, "x?y#z");
        assert!(matches!(
            client.fetch_company("..").await,
            Err(ApiError::Application(_))
        ));
    }

    #[tokio::test]
    async fn lists_market_sectors() {
        let app = Router::new().route(
            "/api/v1/market/sectors",
            get(|| async {
                Json(json!({"sectors": {
                    "Financeiro": ["ITUB4.SA", "BBDC4.SA"],
                    "Petróleo, Gás e Biocombustíveis": ["PETR4.SA"]
                }}))
            }),
        );
        let client = serve(app).await;
        let sectors = client.list_sectors().await.unwrap();
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors["Financeiro"], ["ITUB4.SA", "BBDC4.SA"]);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpReportClient::new(format!("http://{addr}"), ApiPaths::default(), Duration::from_secs(2)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
