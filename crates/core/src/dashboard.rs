use crate::domain::report::Report;
use crate::fetch::{Completion, FetchState, FetchTracker, RequestId};
use crate::format;
use crate::narrative;
use crate::time::b3_market;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
}

pub fn summary_cards(report: &Report) -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            label: "Companies analyzed",
            value: report.total_companies_analyzed.to_string(),
        },
        SummaryCard {
            label: "Positive EVA",
            value: report.summary.positive_eva_count.to_string(),
        },
        SummaryCard {
            label: "Positive EFV",
            value: report.summary.positive_efv_count.to_string(),
        },
        SummaryCard {
            label: "Average upside",
            value: format::format_percent(report.summary.average_upside),
        },
        SummaryCard {
            label: "Generated at",
            value: b3_market::format_report_timestamp(&report.timestamp),
        },
    ]
}

/// A narrative request ready to be sent: which tracker to complete and what to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeRequest {
    pub ticker: String,
    pub id: RequestId,
    pub prompt: String,
}

/// Client-side state of the dashboard: the report flow plus one narrative flow per ticker.
/// The two kinds of flow never touch each other's state.
#[derive(Debug, Default)]
pub struct DashboardState {
    report: FetchTracker<Report>,
    narratives: BTreeMap<String, FetchTracker<String>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_state(&self) -> &FetchState<Report> {
        self.report.state()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.state().data()
    }

    pub fn begin_report_fetch(&mut self) -> RequestId {
        self.report.begin()
    }

    pub fn retry_report(&mut self) -> Option<RequestId> {
        self.report.retry()
    }

    pub fn dismiss_report_error(&mut self) -> bool {
        self.report.dismiss_error()
    }

    pub fn complete_report<E: fmt::Display>(
        &mut self,
        id: RequestId,
        result: Result<Report, E>,
    ) -> Completion {
        let outcome = self.report.complete(id, result);
        match outcome {
            // Narratives were written from the replaced snapshot's metrics.
            Completion::Applied => self.narratives.values_mut().for_each(FetchTracker::reset),
            Completion::Stale => tracing::debug!(%id, "dropping stale report response"),
        }
        outcome
    }

    /// Starts narrative generation for a row of the loaded report. Returns `None` when no
    /// report is loaded or the ticker is not in it.
    pub fn begin_narrative(&mut self, ticker: &str) -> Option<NarrativeRequest> {
        let row = self.report()?.find(ticker)?;
        let ticker = row.ticker.clone();
        let prompt = narrative::company_prompt(row);
        let id = self.narratives.entry(ticker.clone()).or_default().begin();
        Some(NarrativeRequest { ticker, id, prompt })
    }

    pub fn complete_narrative<E: fmt::Display>(
        &mut self,
        ticker: &str,
        id: RequestId,
        result: Result<String, E>,
    ) -> Completion {
        match self.narratives.get_mut(ticker) {
            Some(tracker) => {
                let outcome = tracker.complete(id, result);
                if outcome == Completion::Stale {
                    tracing::debug!(%id, ticker, "dropping stale narrative response");
                }
                outcome
            }
            None => Completion::Stale,
        }
    }

    pub fn narrative(&self, ticker: &str) -> Option<&FetchState<String>> {
        let key = self.report()?.find(ticker)?.ticker.as_str();
        self.narratives.get(key).map(|t| t.state())
    }

    pub fn dismiss_narrative_error(&mut self, ticker: &str) -> bool {
        let Some(key) = self.report().and_then(|r| r.find(ticker)).map(|r| r.ticker.clone()) else {
            return false;
        };
        self.narratives
            .get_mut(&key)
            .is_some_and(|t| t.dismiss_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::fixtures::{report, row};

    fn loaded() -> DashboardState {
        let mut state = DashboardState::new();
        let id = state.begin_report_fetch();
        state.complete_report::<String>(id, Ok(report(vec![row("PETR4.SA", Some(0.5))])));
        state
    }

    #[test]
    fn narrative_requires_a_loaded_report() {
        let mut empty = DashboardState::new();
        assert!(empty.begin_narrative("PETR4.SA").is_none());

        let mut state = loaded();
        assert!(state.begin_narrative("NOPE3.SA").is_none());
        let req = state.begin_narrative("petr4").unwrap();
        assert_eq!(req.ticker, "PETR4.SA");
    }

    #[test]
    fn double_trigger_keeps_one_loading_state_and_latest_response() {
        let mut state = loaded();
        let first = state.begin_narrative("PETR4.SA").unwrap();
        let second = state.begin_narrative("PETR4.SA").unwrap();
        assert_eq!(state.narrative("PETR4.SA"), Some(&FetchState::Loading));

        assert_eq!(
            state.complete_narrative::<String>(&second.ticker, second.id, Ok("new".into())),
            Completion::Applied
        );
        assert_eq!(
            state.complete_narrative::<String>(&first.ticker, first.id, Ok("old".into())),
            Completion::Stale
        );
        assert_eq!(
            state.narrative("PETR4.SA"),
            Some(&FetchState::Success("new".to_string()))
        );
    }

    #[test]
    fn narrative_failure_leaves_report_alone() {
        let mut state = loaded();
        let req = state.begin_narrative("PETR4.SA").unwrap();
        state.complete_narrative(&req.ticker, req.id, Err::<String, _>("quota exceeded"));

        assert!(state.report().is_some());
        assert_eq!(
            state.narrative("PETR4.SA").and_then(|s| s.error()),
            Some("quota exceeded")
        );
        assert!(state.dismiss_narrative_error("PETR4.SA"));
        assert_eq!(state.narrative("PETR4.SA"), Some(&FetchState::Idle));
    }

    #[test]
    fn refetch_drops_narratives_from_the_previous_report() {
        let mut state = loaded();
        let done = state.begin_narrative("PETR4.SA").unwrap();
        state.complete_narrative::<String>(&done.ticker, done.id, Ok("old snapshot text".into()));
        let in_flight = state.begin_narrative("PETR4.SA").unwrap();

        let id = state.begin_report_fetch();
        state.complete_report::<String>(id, Ok(report(vec![row("PETR4.SA", Some(0.9))])));
        assert_eq!(state.narrative("PETR4.SA"), Some(&FetchState::Idle));

        assert_eq!(
            state.complete_narrative::<String>(&in_flight.ticker, in_flight.id, Ok("late".into())),
            Completion::Stale
        );
        assert_eq!(state.narrative("PETR4.SA"), Some(&FetchState::Idle));

        let fresh = state.begin_narrative("PETR4.SA").unwrap();
        assert!(fresh.id > in_flight.id);
    }

    #[test]
    fn report_error_then_retry() {
        let mut state = DashboardState::new();
        let id = state.begin_report_fetch();
        state.complete_report(id, Err::<Report, _>("report payload is missing full_ranking_data"));
        assert!(state.report_state().error().is_some_and(|m| !m.is_empty()));
        assert!(state.report().is_none());

        let retry = state.retry_report().unwrap();
        assert!(state.report_state().is_loading());
        assert_eq!(
            state.complete_report::<String>(retry, Ok(report(vec![]))),
            Completion::Applied
        );
    }

    #[test]
    fn cards_format_summary() {
        let mut r = row("A", None);
        r.upside_percentual = Some(12.5);
        let cards = summary_cards(&report(vec![r]));
        assert_eq!(cards[0].value, "1");
        assert_eq!(cards[3].value, "12.50%");
        assert_eq!(cards[4].value, "14/10/2026 18:30");
    }
}
