use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{
    service_error, ApiError, Recommendation, RecommendRequest, RecommendResponse, RecommendService,
};
use crate::controller::{SearchController, SearchOutcome, EMPTY_QUERY_MESSAGE, SEARCHING_MESSAGE};
use crate::output::{SearchView, StatusTone};

#[derive(Clone, Debug, PartialEq)]
enum ViewEvent {
    Status(String, StatusTone),
    Clear,
    Row(usize, Recommendation),
}

#[derive(Default)]
struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    fn last_status(&self) -> Option<(String, StatusTone)> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                ViewEvent::Status(text, tone) => Some((text, tone)),
                _ => None,
            })
    }

    /// Rows appended since the most recent clear, i.e. the table contents.
    fn table_rows(&self) -> Vec<(usize, Recommendation)> {
        let mut rows = Vec::new();
        for event in self.events() {
            match event {
                ViewEvent::Clear => rows.clear(),
                ViewEvent::Row(rank, recommendation) => rows.push((rank, recommendation)),
                ViewEvent::Status(..) => {}
            }
        }
        rows
    }
}

impl SearchView for RecordingView {
    fn set_status(&self, text: &str, tone: StatusTone) {
        self.events
            .lock()
            .unwrap()
            .push(ViewEvent::Status(text.to_string(), tone));
    }

    fn clear_results(&self) {
        self.events.lock().unwrap().push(ViewEvent::Clear);
    }

    fn append_row(&self, rank: usize, recommendation: &Recommendation) {
        self.events
            .lock()
            .unwrap()
            .push(ViewEvent::Row(rank, recommendation.clone()));
    }
}

#[derive(Default)]
struct FakeInner {
    calls: AtomicUsize,
    requests: Mutex<Vec<RecommendRequest>>,
    script: Mutex<VecDeque<Result<RecommendResponse, ApiError>>>,
}

/// Scripted stand-in for the recommendation backend.
#[derive(Clone, Default)]
struct FakeService {
    inner: Arc<FakeInner>,
}

impl FakeService {
    fn respond_with(results: Vec<Result<RecommendResponse, ApiError>>) -> Self {
        let service = Self::default();
        *service.inner.script.lock().unwrap() = results.into();
        service
    }

    fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<RecommendRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendService for FakeService {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.requests.lock().unwrap().push(request.clone());
        self.inner
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(RecommendResponse {
                    query: request.query.clone(),
                    recommendations: Vec::new(),
                })
            })
    }
}

fn recommendation(name: &str, score: f64) -> Recommendation {
    Recommendation {
        assessment_name: name.to_string(),
        canonical_url: format!("https://example.com/view/{name}"),
        test_type: "Knowledge & Skills".to_string(),
        skills_tags: "tag-a, tag-b".to_string(),
        score,
    }
}

fn response(query: &str, recommendations: Vec<Recommendation>) -> RecommendResponse {
    RecommendResponse {
        query: query.to_string(),
        recommendations,
    }
}

#[tokio::test]
async fn empty_query_sets_validation_status_without_calling_the_service() {
    let service = FakeService::default();
    let controller = SearchController::new(service.clone(), RecordingView::default());

    for raw in ["", "   ", "\t\n"] {
        let outcome = controller.run_search(raw, "7").await;
        assert_eq!(outcome, SearchOutcome::EmptyQuery);
    }

    assert_eq!(service.calls(), 0);
    let (text, tone) = controller.view().last_status().unwrap();
    assert_eq!(text, EMPTY_QUERY_MESSAGE);
    assert_eq!(tone, StatusTone::Error);
    // Validation aborts before the table is touched.
    assert!(!controller.view().events().contains(&ViewEvent::Clear));
}

#[tokio::test]
async fn top_k_resolution_covers_parse_failures_zero_and_negatives() {
    let service = FakeService::default();
    let controller = SearchController::new(service.clone(), RecordingView::default());

    for raw in ["5", "junk", "0", "-3", ""] {
        controller.run_search("query", raw).await;
    }

    let sent: Vec<i64> = service.requests().iter().map(|r| r.top_k).collect();
    assert_eq!(sent, vec![5, 7, 7, -3, 7]);
}

#[tokio::test]
async fn success_renders_rows_in_response_order_with_one_based_ranks() {
    let recs = vec![
        recommendation("first", 0.9),
        recommendation("second", 0.5),
        recommendation("third", 0.1),
    ];
    let service = FakeService::respond_with(vec![Ok(response("java developer", recs.clone()))]);
    let controller = SearchController::new(service, RecordingView::default());

    let outcome = controller.run_search("java developer", "3").await;
    assert!(matches!(outcome, SearchOutcome::Rendered { .. }));

    let events = controller.view().events();
    assert_eq!(
        events[0],
        ViewEvent::Status(SEARCHING_MESSAGE.to_string(), StatusTone::Neutral)
    );
    assert_eq!(events[1], ViewEvent::Clear);
    assert_eq!(
        events[2],
        ViewEvent::Status("Results for: java developer".to_string(), StatusTone::Success)
    );

    let rows = controller.view().table_rows();
    assert_eq!(rows.len(), 3);
    for (i, (rank, rendered)) in rows.iter().enumerate() {
        assert_eq!(*rank, i + 1);
        assert_eq!(rendered, &recs[i]);
    }
}

#[tokio::test]
async fn zero_recommendations_reports_no_results_and_an_empty_table() {
    let service = FakeService::respond_with(vec![Ok(response("cobol", Vec::new()))]);
    let controller = SearchController::new(service, RecordingView::default());

    let outcome = controller.run_search("cobol", "7").await;
    assert_eq!(
        outcome,
        SearchOutcome::NoResults {
            query: "cobol".to_string()
        }
    );

    let (text, _) = controller.view().last_status().unwrap();
    assert_eq!(text, "No results found for: cobol");
    assert!(controller.view().table_rows().is_empty());
}

#[tokio::test]
async fn service_error_message_is_surfaced_with_console_hint() {
    let service = FakeService::respond_with(vec![Err(ApiError::Service {
        status: 400,
        message: "bad input".to_string(),
    })]);
    let controller = SearchController::new(service, RecordingView::default());

    let outcome = controller.run_search("query", "7").await;
    assert_eq!(
        outcome,
        SearchOutcome::Failed {
            message: "bad input".to_string()
        }
    );

    let (text, tone) = controller.view().last_status().unwrap();
    assert_eq!(text, "Error: bad input. Check console for details.");
    assert_eq!(tone, StatusTone::Error);
    assert!(controller.view().table_rows().is_empty());
}

#[tokio::test]
async fn service_error_without_body_message_names_the_status_code() {
    let service = FakeService::respond_with(vec![Err(service_error(503, "{}"))]);
    let controller = SearchController::new(service, RecordingView::default());

    controller.run_search("query", "7").await;

    let (text, _) = controller.view().last_status().unwrap();
    assert_eq!(
        text,
        "Error: request failed with status 503. Check console for details."
    );
}

#[tokio::test]
async fn decode_failure_is_reported_like_any_other_error() {
    let service = FakeService::respond_with(vec![Err(ApiError::Decode {
        detail: "missing field `score`".to_string(),
    })]);
    let controller = SearchController::new(service, RecordingView::default());

    let outcome = controller.run_search("query", "7").await;
    assert!(matches!(outcome, SearchOutcome::Failed { .. }));

    let (text, tone) = controller.view().last_status().unwrap();
    assert_eq!(
        text,
        "Error: invalid response body: missing field `score`. Check console for details."
    );
    assert_eq!(tone, StatusTone::Error);
}

#[tokio::test]
async fn each_search_clears_rows_from_the_previous_one() {
    let service = FakeService::respond_with(vec![
        Ok(response("a", vec![recommendation("stale-row", 0.4)])),
        Ok(response("b", vec![recommendation("fresh-row", 0.8)])),
    ]);
    let controller = SearchController::new(service, RecordingView::default());

    controller.run_search("a", "7").await;
    controller.run_search("b", "7").await;

    let rows = controller.view().table_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.assessment_name, "fresh-row");
}

#[tokio::test]
async fn an_error_still_leaves_the_table_cleared() {
    let service = FakeService::respond_with(vec![
        Ok(response("a", vec![recommendation("old", 0.4)])),
        Err(ApiError::Service {
            status: 500,
            message: "boom".to_string(),
        }),
    ]);
    let controller = SearchController::new(service, RecordingView::default());

    controller.run_search("a", "7").await;
    controller.run_search("b", "7").await;

    assert!(controller.view().table_rows().is_empty());
}

/// First call blocks until the second call has completed, forcing the
/// out-of-order arrival the sequence guard exists for.
struct GatedService {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl RecommendService for GatedService {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            self.gate.notified().await;
        } else {
            self.gate.notify_one();
        }
        Ok(response(
            &request.query,
            vec![recommendation(&format!("row-{}", request.query), 0.5)],
        ))
    }
}

#[tokio::test]
async fn a_superseded_search_never_touches_the_view() {
    let service = GatedService {
        gate: Notify::new(),
        calls: AtomicUsize::new(0),
    };
    let controller = SearchController::new(service, RecordingView::default());

    let (first, second) = tokio::join!(
        controller.run_search("first", "7"),
        controller.run_search("second", "7"),
    );

    assert_eq!(first, SearchOutcome::Stale);
    assert!(matches!(second, SearchOutcome::Rendered { .. }));

    let events = controller.view().events();
    assert!(!events.contains(&ViewEvent::Status(
        "Results for: first".to_string(),
        StatusTone::Success
    )));
    let rows = controller.view().table_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.assessment_name, "row-second");
}
