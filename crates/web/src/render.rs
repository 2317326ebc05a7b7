//! Server-side HTML for the dashboard pages.

use ibovdash_core::chart::report::{EVA_VS_EFV_CHART, TOP_SCORES_CHART, TOP_UPSIDE_CHART};
use ibovdash_core::chart::svg::SvgSurfaceFactory;
use ibovdash_core::chart::ChartBoard;
use ibovdash_core::dashboard::summary_cards;
use ibovdash_core::detail::{DetailView, EMPTY_STATE};
use ibovdash_core::domain::report::Report;
use ibovdash_core::fetch::FetchState;
use ibovdash_core::markup::{escape_html, narrative_to_html};
use ibovdash_core::table::{sorted_rows, SortConfig, SortDirection, SortKey};

const CHART_ORDER: [&str; 3] = [TOP_SCORES_CHART, TOP_UPSIDE_CHART, EVA_VS_EFV_CHART];

pub fn dashboard_page(
    state: &FetchState<Report>,
    sort: &SortConfig,
    charts: &ChartBoard<SvgSurfaceFactory>,
) -> String {
    let (body, refresh) = match state {
        FetchState::Idle => (
            format!(
                r#"<p class="placeholder">No report loaded.</p>{controls}"#,
                controls = controls()
            ),
            false,
        ),
        FetchState::Loading => (
            r#"<p class="placeholder" aria-busy="true">Loading report&hellip;</p>"#.to_string(),
            true,
        ),
        FetchState::Error(message) => (
            format!(
                "{banner}{controls}",
                banner = error_banner(message, "/retry", "/dismiss"),
                controls = controls()
            ),
            false,
        ),
        FetchState::Success(report) => (
            format!(
                "{controls}{cards}{charts}{table}",
                controls = controls(),
                cards = render_cards(report),
                charts = render_charts(charts),
                table = render_table(report, sort),
            ),
            false,
        ),
    };

    layout("Ibovespa valuation ranking", &body, refresh)
}

pub fn detail_page(view: &DetailView<'_>, narrative: Option<&FetchState<String>>) -> String {
    let body = match view {
        DetailView::NotFound { ticker } => format!(
            r#"<p class="placeholder">{msg} ({ticker})</p>"#,
            msg = EMPTY_STATE,
            ticker = escape_html(ticker),
        ),
        DetailView::Found { row, fields } => {
            let mut dl = String::from(r#"<dl class="detail">"#);
            for field in fields {
                dl.push_str(&format!(
                    "<dt>{}</dt><dd>{}</dd>",
                    escape_html(field.label),
                    escape_html(&field.value)
                ));
            }
            dl.push_str("</dl>");
            format!(
                r#"<h2>{name} <small>{ticker}</small></h2>{dl}{narrative}"#,
                name = escape_html(&row.company_name),
                ticker = escape_html(&row.ticker),
                narrative = render_narrative(&row.ticker, narrative),
            )
        }
    };

    let refresh = narrative.is_some_and(|s| s.is_loading());
    layout(
        "Company detail",
        &format!(r#"<p><a href="/">&larr; Back to ranking</a></p>{body}"#),
        refresh,
    )
}

/// Detail page link for a ticker; the ticker travels as one percent-encoded segment.
pub fn company_path(ticker: &str) -> String {
    format!("/company/{}", urlencoding::encode(ticker))
}

fn layout(title: &str, body: &str, auto_refresh: bool) -> String {
    let refresh = if auto_refresh {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
{refresh}
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<main class="container">
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
        css = inline_css(),
    )
}

fn controls() -> String {
    r#"<div class="controls">
<form method="post" action="/refresh"><button type="submit">Refresh ranking</button></form>
<form method="post" action="/analyze"><label>Companies <input type="number" name="num_companies" min="1" placeholder="all"></label><button type="submit">Run analysis</button></form>
</div>"#
        .to_string()
}

fn error_banner(message: &str, retry_action: &str, dismiss_action: &str) -> String {
    format!(
        r#"<div class="banner banner--error" role="alert"><span>{message}</span><form method="post" action="{retry}"><button type="submit">Retry</button></form><form method="post" action="{dismiss}"><button type="submit" aria-label="Dismiss">&times;</button></form></div>"#,
        message = escape_html(message),
        retry = escape_html(retry_action),
        dismiss = escape_html(dismiss_action),
    )
}

fn render_cards(report: &Report) -> String {
    let cards: String = summary_cards(report)
        .into_iter()
        .map(|card| {
            format!(
                r#"<div class="card"><span class="card__label">{}</span><strong class="card__value">{}</strong></div>"#,
                escape_html(card.label),
                escape_html(&card.value)
            )
        })
        .collect();
    format!(r#"<section class="cards">{cards}</section>"#)
}

fn render_charts(charts: &ChartBoard<SvgSurfaceFactory>) -> String {
    let svgs: String = CHART_ORDER
        .iter()
        .filter_map(|id| charts.surface(id).and_then(|s| s.markup()))
        .map(|svg| format!(r#"<figure class="chart-frame">{svg}</figure>"#))
        .collect();
    format!(r#"<section class="charts">{svgs}</section>"#)
}

fn render_table(report: &Report, sort: &SortConfig) -> String {
    let mut out = String::from(r#"<table class="ranking"><thead><tr>"#);
    for key in SortKey::ALL {
        let next = sort.click(key);
        let indicator = match (key == sort.key, sort.direction) {
            (true, SortDirection::Descending) => " &#9660;",
            (true, SortDirection::Ascending) => " &#9650;",
            (false, _) => "",
        };
        out.push_str(&format!(
            r#"<th><a href="/?sort={key}&amp;dir={dir}">{label}</a>{indicator}</th>"#,
            key = next.key,
            dir = next.direction.as_str(),
            label = escape_html(key.label()),
        ));
    }
    out.push_str("</tr></thead><tbody>");

    for row in sorted_rows(&report.rows, sort) {
        out.push_str("<tr>");
        for key in SortKey::ALL {
            let cell = escape_html(&key.display(row));
            if key == SortKey::Ticker {
                out.push_str(&format!(
                    r#"<td><a href="{href}">{cell}</a></td>"#,
                    href = escape_html(&company_path(&row.ticker))
                ));
            } else {
                out.push_str(&format!("<td>{cell}</td>"));
            }
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
    out
}

fn render_narrative(ticker: &str, state: Option<&FetchState<String>>) -> String {
    let action = escape_html(&format!("{}/narrative", company_path(ticker)));
    let button = format!(
        r#"<form method="post" action="{action}"><button type="submit">Generate summary</button></form>"#
    );

    let inner = match state {
        None | Some(FetchState::Idle) => button,
        Some(FetchState::Loading) => {
            r#"<p class="placeholder" aria-busy="true">Generating summary&hellip;</p>"#.to_string()
        }
        Some(FetchState::Success(text)) => format!(
            r#"<div class="narrative__text">{}</div>{button}"#,
            narrative_to_html(text)
        ),
        Some(FetchState::Error(message)) => {
            error_banner(message, &action, &format!("{action}/dismiss"))
        }
    };

    format!(r#"<section class="narrative"><h3>Summary</h3>{inner}</section>"#)
}

fn inline_css() -> &'static str {
    r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1d2330; }
.container { max-width: 1200px; margin: 0 auto; padding: 24px; }
.controls { display: flex; gap: 12px; margin-bottom: 16px; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }
.card { background: #fff; border-radius: 8px; padding: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
.card__label { display: block; font-size: 12px; color: #5b6475; }
.card__value { font-size: 22px; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(380px, 1fr)); gap: 12px; margin: 16px 0; }
.chart-frame { margin: 0; background: #fff; border-radius: 8px; padding: 8px; }
.chart__bar { fill: #2f6fde; }
.chart__bar--negative { fill: #d9534f; }
.chart__point { fill: #2f6fde; }
.chart__baseline { stroke: #8a93a6; }
.chart__tick, .chart__point-label, .chart__axis-label { font-size: 10px; fill: #5b6475; }
.chart__title { font-size: 13px; font-weight: 600; }
.ranking { width: 100%; border-collapse: collapse; background: #fff; }
.ranking th, .ranking td { padding: 6px 8px; border-bottom: 1px solid #e3e6eb; text-align: right; }
.ranking th:nth-child(-n+2), .ranking td:nth-child(-n+2) { text-align: left; }
.banner--error { display: flex; gap: 12px; align-items: center; background: #fdecea; border: 1px solid #f5c2c0; padding: 10px; border-radius: 6px; margin-bottom: 16px; }
.placeholder { color: #5b6475; }
.detail { display: grid; grid-template-columns: max-content 1fr; gap: 4px 16px; }
"#
}
