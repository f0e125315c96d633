use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{RecommendRequest, RecommendResponse, RecommendService};
use crate::output::{SearchView, StatusTone};
use crate::utils;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query in the text box.";
pub const SEARCHING_MESSAGE: &str = "Searching...";

/// Terminal state of one search interaction. Exactly one of these is
/// produced per trigger.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// Empty or whitespace-only query; the service was never called.
    EmptyQuery,
    Rendered {
        response: RecommendResponse,
    },
    NoResults {
        query: String,
    },
    Failed {
        message: String,
    },
    /// A newer search started while this one was in flight; the response
    /// was discarded without touching the view.
    Stale,
}

/// Orchestrates one search interaction: validate the query, resolve top_k,
/// call the recommendation service once, and render the outcome to the view.
///
/// A monotonic sequence token guards the shared view: a response that
/// arrives after a newer search has started is discarded, so the rendered
/// table always reflects the most recent request.
pub struct SearchController<S, V> {
    service: S,
    view: V,
    seq: AtomicU64,
}

impl<S, V> SearchController<S, V>
where
    S: RecommendService,
    V: SearchView,
{
    pub fn new(service: S, view: V) -> Self {
        Self {
            service,
            view,
            seq: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn is_current(&self, token: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == token
    }

    pub async fn run_search(&self, raw_query: &str, raw_top_k: &str) -> SearchOutcome {
        let query = raw_query.trim();
        if query.is_empty() {
            self.view.set_status(EMPTY_QUERY_MESSAGE, StatusTone::Error);
            return SearchOutcome::EmptyQuery;
        }

        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.view.set_status(SEARCHING_MESSAGE, StatusTone::Neutral);
        self.view.clear_results();

        let request = RecommendRequest {
            query: query.to_string(),
            top_k: utils::resolve_top_k(raw_top_k),
        };
        tracing::debug!(query = %request.query, top_k = request.top_k, "sending recommend request");

        match self.service.recommend(&request).await {
            Ok(response) => {
                if !self.is_current(token) {
                    tracing::debug!(query = %response.query, "discarding stale response");
                    return SearchOutcome::Stale;
                }
                self.view.set_status(
                    &format!("Results for: {}", response.query),
                    StatusTone::Success,
                );
                if response.recommendations.is_empty() {
                    self.view.set_status(
                        &format!("No results found for: {}", response.query),
                        StatusTone::Neutral,
                    );
                    return SearchOutcome::NoResults {
                        query: response.query,
                    };
                }
                for (i, recommendation) in response.recommendations.iter().enumerate() {
                    self.view.append_row(i + 1, recommendation);
                }
                SearchOutcome::Rendered { response }
            }
            Err(e) => {
                tracing::error!(
                    error = ?e,
                    query = %request.query,
                    top_k = request.top_k,
                    "recommend request failed"
                );
                if !self.is_current(token) {
                    return SearchOutcome::Stale;
                }
                let message = e.to_string();
                self.view.set_status(
                    &format!("Error: {message}. Check console for details."),
                    StatusTone::Error,
                );
                SearchOutcome::Failed { message }
            }
        }
    }
}
