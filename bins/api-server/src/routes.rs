use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use genai::{generate_match_predictions, summarize_match_analysis, FlowError, TextGenerator};
use predictpal_core::Language;
use schedule::{catalogue, DayView, MatchCardLabels, MatchDialogLabels, MatchView, SchedulePage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    /// `None` when no generative service is configured; flow endpoints then
    /// answer 503.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub default_language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/flows/match-predictions", post(post_match_predictions))
        .route("/flows/match-analysis-summary", post(post_match_summary))
        .route("/club-world-cup", get(get_schedule_page))
        .route("/club-world-cup/days/:date", get(get_schedule_day))
        .route("/club-world-cup/matches/:id", get(get_schedule_match))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn post_match_predictions(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let Some(generator) = state.generator.as_deref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "prediction service unavailable",
        );
    };

    match generate_match_predictions(generator, &input).await {
        Ok(prediction) => Json(ApiResponse::ok(prediction)).into_response(),
        Err(err) => flow_error_response("generateMatchPredictions", err),
    }
}

async fn post_match_summary(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let Some(generator) = state.generator.as_deref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "summary service unavailable",
        );
    };

    match summarize_match_analysis(generator, &input).await {
        Ok(summary) => Json(ApiResponse::ok(summary)).into_response(),
        Err(err) => flow_error_response("summarizeMatchAnalysis", err),
    }
}

fn flow_error_response(flow: &str, err: FlowError) -> Response {
    match &err {
        FlowError::Validation { .. } => {
            info!(flow, error = %err, "rejected flow input");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        FlowError::Generation(_) | FlowError::SchemaMismatch { .. } => {
            warn!(flow, error = %err, "flow failed");
            error_response(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct LanguageQuery {
    lang: Option<String>,
}

impl LanguageQuery {
    fn resolve(&self, fallback: Language) -> Language {
        self.lang
            .as_deref()
            .and_then(|code| code.parse().ok())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchedulePageView<'a> {
    language: Language,
    switch_to: Language,
    meta_title: &'a str,
    meta_description: &'a str,
    page_title: &'a str,
    select_day_prompt: &'a str,
    default_day: Option<NaiveDate>,
    match_card: &'a MatchCardLabels,
    match_dialog: &'a MatchDialogLabels,
    days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchLookup {
    date: NaiveDate,
    day_label: String,
    #[serde(rename = "match")]
    fixture: MatchView,
}

fn schedule_page(language: Language) -> Result<&'static SchedulePage, Response> {
    catalogue().map(|c| c.page(language)).map_err(|err| {
        warn!(error = %err, "schedule catalogue unavailable");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "schedule unavailable")
    })
}

async fn get_schedule_page(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    let language = query.resolve(state.default_language);
    let page = match schedule_page(language) {
        Ok(page) => page,
        Err(response) => return response,
    };

    let view = SchedulePageView {
        language,
        switch_to: language.toggle(),
        meta_title: &page.meta_title,
        meta_description: &page.meta_description,
        page_title: &page.page_title,
        select_day_prompt: &page.select_day_prompt,
        default_day: page.default_day().map(|day| day.date),
        match_card: &page.match_card,
        match_dialog: &page.match_dialog,
        days: page.schedule.iter().map(|day| page.day_view(day)).collect(),
    };
    Json(ApiResponse::ok(view)).into_response()
}

async fn get_schedule_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    let Ok(date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid date `{date}`, expected YYYY-MM-DD"),
        );
    };
    let page = match schedule_page(query.resolve(state.default_language)) {
        Ok(page) => page,
        Err(response) => return response,
    };

    match page.day(date) {
        Some(day) => Json(ApiResponse::ok(page.day_view(day))).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("no schedule for {date}")),
    }
}

async fn get_schedule_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    let page = match schedule_page(query.resolve(state.default_language)) {
        Ok(page) => page,
        Err(response) => return response,
    };

    match page.find_match(&id) {
        Some((day, fixture)) => Json(ApiResponse::ok(MatchLookup {
            date: day.date,
            day_label: page.day_label(day),
            fixture: page.match_view(fixture),
        }))
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("unknown match `{id}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use genai::GenerationRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedGenerator {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _request: GenerationRequest<'_>) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn state_with(reply: Option<Value>) -> (AppState, Arc<FixedGenerator>) {
        let generator = Arc::new(FixedGenerator {
            reply: reply.map(|v| v.to_string()),
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            generator: Some(generator.clone()),
            default_language: Language::En,
        };
        (state, generator)
    }

    fn unconfigured() -> AppState {
        AppState {
            generator: None,
            default_language: Language::Es,
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(unconfigured(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn prediction_endpoint_returns_envelope() {
        let (state, generator) = state_with(Some(json!({
            "prediction": "Team A wins",
            "confidenceLevel": "70%",
            "rationale": "Home form",
        })));
        let (status, body) = send(
            state,
            post_json("/api/flows/match-predictions", json!({"matchDetails": "A vs B"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["confidenceLevel"], "70%");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request_without_generation() {
        let (state, generator) = state_with(Some(json!({"summary": "x"})));
        let (status, body) = send(
            state,
            post_json("/api/flows/match-analysis-summary", json!({"analysis": "typo"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("matchAnalysis"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (state, _) = state_with(None);
        let request = Request::post("/api/flows/match-predictions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn empty_generation_is_bad_gateway() {
        let (state, _) = state_with(None);
        let (status, body) = send(
            state,
            post_json("/api/flows/match-analysis-summary", json!({"matchAnalysis": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn missing_generator_is_unavailable() {
        let (status, body) = send(
            unconfigured(),
            post_json("/api/flows/match-predictions", json!({"matchDetails": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "prediction service unavailable");
    }

    #[tokio::test]
    async fn schedule_uses_default_language_and_lang_override() {
        let (_, spanish) = send(unconfigured(), get("/api/club-world-cup")).await;
        assert_eq!(spanish["data"]["language"], "es");
        assert_eq!(spanish["data"]["switchTo"], "en");
        assert_eq!(spanish["data"]["days"][0]["label"], "15 de Junio, 2025");

        let (_, english) = send(unconfigured(), get("/api/club-world-cup?lang=en")).await;
        assert_eq!(english["data"]["pageTitle"], "Club World Cup 2025 Schedule");
        assert_eq!(english["data"]["defaultDay"], "2025-06-15");

        let (_, fallback) = send(unconfigured(), get("/api/club-world-cup?lang=fr")).await;
        assert_eq!(fallback["data"]["language"], "es");
    }

    #[tokio::test]
    async fn schedule_day_lookup() {
        let (status, body) =
            send(unconfigured(), get("/api/club-world-cup/days/2025-06-17?lang=en")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["emptyMessage"], "No matches scheduled for this day.");

        let (status, _) = send(unconfigured(), get("/api/club-world-cup/days/2025-07-01")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(unconfigured(), get("/api/club-world-cup/days/tomorrow")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn schedule_match_lookup() {
        let (status, body) = send(unconfigured(), get("/api/club-world-cup/matches/m3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["date"], "2025-06-16");
        assert_eq!(body["data"]["match"]["statusLabel"], "En Vivo");

        let (status, _) = send(unconfigured(), get("/api/club-world-cup/matches/m42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
