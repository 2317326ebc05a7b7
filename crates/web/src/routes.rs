use crate::render;
use crate::state::{AppState, ReportJob};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use ibovdash_core::detail;
use ibovdash_core::table::{SortConfig, SortDirection, SortKey};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(dashboard))
        .route("/refresh", post(refresh))
        .route("/analyze", post(analyze))
        .route("/retry", post(retry))
        .route("/dismiss", post(dismiss))
        .route("/company/:ticker", get(company))
        .route("/company/:ticker/narrative", post(generate_narrative))
        .route("/company/:ticker/narrative/dismiss", post(dismiss_narrative))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    sort: Option<String>,
    dir: Option<String>,
}

impl SortParams {
    fn to_config(&self) -> SortConfig {
        let default = SortConfig::default();
        let key = match self.sort.as_deref().map(str::parse::<SortKey>) {
            Some(Ok(key)) => key,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "ignoring sort parameter");
                default.key
            }
            None => default.key,
        };
        let direction = self
            .dir
            .as_deref()
            .and_then(|d| d.parse::<SortDirection>().ok())
            .unwrap_or(default.direction);
        SortConfig::new(key, direction)
    }
}

async fn dashboard(State(state): State<AppState>, Query(params): Query<SortParams>) -> Html<String> {
    let sort = params.to_config();
    let mut ui = state.ui.lock().await;
    ui.sync_charts();
    Html(render::dashboard_page(
        ui.dashboard.report_state(),
        &sort,
        &ui.charts,
    ))
}

async fn refresh(State(state): State<AppState>) -> Redirect {
    state.start_report_job(ReportJob::Ranking).await;
    Redirect::to("/")
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    num_companies: Option<String>,
}

async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Response {
    let num_companies = match form.num_companies.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    "num_companies must be a positive integer or blank",
                )
                    .into_response()
            }
        },
    };

    state
        .start_report_job(ReportJob::Analysis { num_companies })
        .await;
    Redirect::to("/").into_response()
}

async fn retry(State(state): State<AppState>) -> Redirect {
    if state.retry_report_job().await.is_none() {
        tracing::debug!("retry ignored; report is not in the error state");
    }
    Redirect::to("/")
}

async fn dismiss(State(state): State<AppState>) -> Redirect {
    state.ui.lock().await.dashboard.dismiss_report_error();
    Redirect::to("/")
}

async fn company(State(state): State<AppState>, Path(ticker): Path<String>) -> Response {
    let ui = state.ui.lock().await;
    let Some(report) = ui.dashboard.report() else {
        return Redirect::to("/").into_response();
    };

    let view = detail::select(report, &ticker);
    let narrative = ui.dashboard.narrative(&ticker);
    Html(render::detail_page(&view, narrative)).into_response()
}

async fn generate_narrative(State(state): State<AppState>, Path(ticker): Path<String>) -> Response {
    match state.start_narrative(&ticker).await {
        Some(_) => Redirect::to(&render::company_path(&ticker)).into_response(),
        None => (StatusCode::NOT_FOUND, detail::EMPTY_STATE).into_response(),
    }
}

async fn dismiss_narrative(State(state): State<AppState>, Path(ticker): Path<String>) -> Redirect {
    state
        .ui
        .lock()
        .await
        .dashboard
        .dismiss_narrative_error(&ticker);
    Redirect::to(&render::company_path(&ticker))
}
