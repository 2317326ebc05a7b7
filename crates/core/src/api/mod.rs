pub mod error;
pub mod http;

use crate::domain::report::{CompanyDetail, CompanyListing, HealthStatus, Report, SectorMap};
pub use error::ApiError;
pub use http::{ApiPaths, HttpReportClient};

/// The analysis backend as seen by the dashboard.
#[async_trait::async_trait]
pub trait ReportSource: Send + Sync {
    /// Latest precomputed ranking.
    async fn fetch_ranking(&self) -> Result<Report, ApiError>;

    /// Runs a fresh analysis; `None` analyzes every company.
    async fn run_analysis(&self, num_companies: Option<u32>) -> Result<Report, ApiError>;

    async fn fetch_company(&self, ticker: &str) -> Result<CompanyDetail, ApiError>;

    async fn list_companies(&self) -> Result<Vec<CompanyListing>, ApiError>;

    /// Sector name to member tickers.
    async fn list_sectors(&self) -> Result<SectorMap, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
