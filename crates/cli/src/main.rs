use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use ibovdash_core::api::{HttpReportClient, ReportSource};
use ibovdash_core::detail::{self, DetailView};
use ibovdash_core::domain::report::Report;
use ibovdash_core::narrative::gemini::GeminiClient;
use ibovdash_core::narrative::{company_prompt, NarrativeClient};
use ibovdash_core::table::{SortConfig, SortDirection, SortKey};
use ibovdash_core::time::b3_market;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod print;

#[derive(Debug, Parser)]
#[command(name = "ibovdash")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the latest precomputed ranking and print it.
    Ranking(ViewArgs),

    /// Ask the analysis server for a fresh run, then print the resulting ranking.
    Analyze {
        /// Limit the run to the first N companies. Omit to analyze all of them.
        #[arg(long)]
        num_companies: Option<u32>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Server-side detail for one ticker.
    Company { ticker: String },

    /// Detail for one ticker, taken from the ranking report.
    Show { ticker: String },

    /// Generate an LLM summary for one ticker of the ranking report.
    Narrate { ticker: String },

    /// List the tickers the analysis server knows about.
    Companies,

    /// List market sectors and their member tickers.
    Sectors,

    /// Check that the analysis server is up.
    Health,
}

#[derive(Debug, ClapArgs)]
struct ViewArgs {
    /// Sort column (e.g. combined_score, ticker, market_cap).
    #[arg(long, default_value_t = SortKey::CombinedScore)]
    sort: SortKey,

    /// Sort direction: asc or desc.
    #[arg(long, default_value = "desc")]
    dir: SortDirection,

    /// Print at most N rows.
    #[arg(long)]
    limit: Option<usize>,

    /// Also draw the summary charts.
    #[arg(long)]
    charts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ibovdash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args.command, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

async fn run(command: Command, settings: &ibovdash_core::config::Settings) -> anyhow::Result<()> {
    let client = HttpReportClient::from_settings(settings)?;

    match command {
        Command::Ranking(view) => {
            let report = client
                .fetch_ranking()
                .await
                .context("fetch ranking failed")?;
            print_report(&report, &view)
        }
        Command::Analyze {
            num_companies,
            view,
        } => {
            let report = client
                .run_analysis(num_companies)
                .await
                .context("analysis run failed")?;
            print_report(&report, &view)
        }
        Command::Company { ticker } => {
            let company = client
                .fetch_company(&ticker)
                .await
                .with_context(|| format!("fetch company {ticker} failed"))?;
            println!("{} ({})", company.company_name, company.ticker);
            print_lines(print::fields(&detail::company_detail_fields(&company)));
            Ok(())
        }
        Command::Show { ticker } => {
            let report = client
                .fetch_ranking()
                .await
                .context("fetch ranking failed")?;
            match detail::select(&report, &ticker) {
                DetailView::Found { row, fields } => {
                    println!("{} ({})", row.company_name, row.ticker);
                    print_lines(print::fields(&fields));
                }
                DetailView::NotFound { ticker } => {
                    println!("{} ({ticker})", detail::EMPTY_STATE);
                }
            }
            Ok(())
        }
        Command::Narrate { ticker } => {
            let narrator = GeminiClient::from_settings(settings)?;
            let report = client
                .fetch_ranking()
                .await
                .context("fetch ranking failed")?;
            let row = report
                .find(&ticker)
                .with_context(|| format!("{ticker}: {}", detail::EMPTY_STATE))?;

            tracing::info!(ticker = %row.ticker, provider = narrator.provider_name(), "generating narrative");
            let text = narrator.generate(&company_prompt(row)).await?;
            println!("{} ({})\n", row.company_name, row.ticker);
            println!("{}", text.trim());
            Ok(())
        }
        Command::Companies => {
            let companies = client
                .list_companies()
                .await
                .context("list companies failed")?;
            for c in &companies {
                println!("{:<12} {}", c.ticker, c.ticker_clean);
            }
            println!("{} companies", companies.len());
            Ok(())
        }
        Command::Sectors => {
            let sectors = client
                .list_sectors()
                .await
                .context("list sectors failed")?;
            print_lines(print::sectors(&sectors));
            Ok(())
        }
        Command::Health => {
            let health = client.health().await.context("health check failed")?;
            match health.timestamp.as_deref() {
                Some(ts) => println!("{} ({})", health.status, b3_market::format_report_timestamp(ts)),
                None => println!("{}", health.status),
            }
            Ok(())
        }
    }
}

fn print_report(report: &Report, view: &ViewArgs) -> anyhow::Result<()> {
    print_lines(print::cards(report));
    if let Some(age) = b3_market::report_age(&report.timestamp, chrono::Utc::now()) {
        println!("(report is {} min old)", age.num_minutes().max(0));
    }
    println!();

    if view.charts {
        print_lines(print::charts(report)?);
    }

    let sort = SortConfig::new(view.sort, view.dir);
    print_lines(print::ranking_table(report, &sort, view.limit));
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn init_sentry(settings: &ibovdash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
