use ibovdash_core::api::{ApiError, ReportSource};
use ibovdash_core::chart::report::{dashboard_charts, DEFAULT_TOP_N};
use ibovdash_core::chart::svg::SvgSurfaceFactory;
use ibovdash_core::chart::ChartBoard;
use ibovdash_core::dashboard::{DashboardState, NarrativeRequest};
use ibovdash_core::fetch::RequestId;
use ibovdash_core::narrative::{NarrativeClient, NarrativeError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Which backend call feeds the report tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportJob {
    Ranking,
    Analysis { num_companies: Option<u32> },
}

pub struct Ui {
    pub dashboard: DashboardState,
    pub charts: ChartBoard<SvgSurfaceFactory>,
    last_job: ReportJob,
}

impl Ui {
    fn new() -> Self {
        Self {
            dashboard: DashboardState::new(),
            charts: ChartBoard::new(SvgSurfaceFactory),
            last_job: ReportJob::Ranking,
        }
    }

    /// Brings the chart board in line with the current report: one surface per chart while
    /// a report is shown, none otherwise.
    pub fn sync_charts(&mut self) {
        let Some(report) = self.dashboard.report() else {
            self.charts.unmount_all();
            return;
        };

        let charts = dashboard_charts(report, DEFAULT_TOP_N);
        let ids: Vec<&str> = charts.iter().map(|(id, _)| *id).collect();
        for (chart_id, spec) in charts {
            if let Err(err) = self.charts.mount(chart_id, spec) {
                tracing::warn!(chart_id, error = %err, "chart render failed");
                self.charts.unmount(chart_id);
            }
        }
        self.charts.retain(&ids);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ui: Arc<Mutex<Ui>>,
    source: Arc<dyn ReportSource>,
    narrator: Option<Arc<dyn NarrativeClient>>,
}

impl AppState {
    pub fn new(source: Arc<dyn ReportSource>, narrator: Option<Arc<dyn NarrativeClient>>) -> Self {
        Self {
            ui: Arc::new(Mutex::new(Ui::new())),
            source,
            narrator,
        }
    }

    /// Starts `job` in the background. Returns the request id the completion will carry.
    pub async fn start_report_job(&self, job: ReportJob) -> RequestId {
        let id = {
            let mut ui = self.ui.lock().await;
            ui.last_job = job;
            ui.dashboard.begin_report_fetch()
        };
        self.spawn_report_job(id, job);
        id
    }

    /// Re-runs the last job if the report is in the error state.
    pub async fn retry_report_job(&self) -> Option<RequestId> {
        let (id, job) = {
            let mut ui = self.ui.lock().await;
            let job = ui.last_job;
            (ui.dashboard.retry_report()?, job)
        };
        self.spawn_report_job(id, job);
        Some(id)
    }

    fn spawn_report_job(&self, id: RequestId, job: ReportJob) {
        let state = self.clone();
        tokio::spawn(async move {
            state.run_report_job(id, job).await;
        });
    }

    pub async fn run_report_job(&self, id: RequestId, job: ReportJob) {
        tracing::info!(%id, ?job, "report request started");
        let result = match job {
            ReportJob::Ranking => self.source.fetch_ranking().await,
            ReportJob::Analysis { num_companies } => self.source.run_analysis(num_companies).await,
        };

        if let Err(err) = &result {
            report_failure(err);
        }

        let mut ui = self.ui.lock().await;
        let outcome = ui.dashboard.complete_report(id, result);
        ui.sync_charts();
        tracing::info!(%id, ?outcome, "report request finished");
    }

    /// Starts narrative generation for `ticker`. `None` when the report is not loaded or
    /// does not contain the ticker.
    pub async fn start_narrative(&self, ticker: &str) -> Option<RequestId> {
        let request = self.ui.lock().await.dashboard.begin_narrative(ticker)?;
        let id = request.id;
        let state = self.clone();
        tokio::spawn(async move {
            state.run_narrative(request).await;
        });
        Some(id)
    }

    pub async fn run_narrative(&self, request: NarrativeRequest) {
        let result = match &self.narrator {
            Some(narrator) => {
                tracing::info!(ticker = %request.ticker, provider = narrator.provider_name(), "generating narrative");
                narrator.generate(&request.prompt).await
            }
            None => Err(NarrativeError::new(
                "config",
                "GEMINI_API_KEY is not configured on this server",
            )),
        };

        if let Err(err) = &result {
            tracing::warn!(ticker = %request.ticker, error = %err, "narrative generation failed");
        }

        self.ui
            .lock()
            .await
            .dashboard
            .complete_narrative(&request.ticker, request.id, result);
    }
}

fn report_failure(err: &ApiError) {
    let err = anyhow::Error::new(err.clone());
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "report request failed");
}
