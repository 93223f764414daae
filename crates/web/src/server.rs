use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use co2calc_core::{EmissionsCalculator, EmissionsError, EmissionsForm, EmissionsResult};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::page::{render_page, PageView};

/// Largest request body accepted by any route.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub calculator: EmissionsCalculator,
    pub start_time: Instant,
    pub req_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(calculator: EmissionsCalculator) -> Self {
        Self {
            calculator,
            start_time: Instant::now(),
            req_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_request(&self) {
        self.req_count.fetch_add(1, Ordering::Relaxed);
    }

    fn requests_total(&self) -> u64 {
        self.req_count.load(Ordering::Relaxed) as u64
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Validate and price one submission.
    fn estimate(&self, form: &EmissionsForm) -> Result<EmissionsResult, EmissionsError> {
        let request = form.validate()?;
        self.calculator.calculate(&request)
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    service: &'static str,
    uptime_secs: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<EmissionsError> for ApiError {
    fn from(err: EmissionsError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(Arc::new(state));
    let listener = bind_listener(addr).await?;
    info!(
        "CO2 calculator listening on {}",
        listener.local_addr().context("listener has no local address")?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_index).post(handle_submit))
        .route("/api/emissions", post(handle_api_emissions))
        .route("/api/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index(State(state): State<SharedState>) -> Html<String> {
    state.record_request();
    Html(render_page(&PageView::empty()))
}

async fn handle_submit(
    State(state): State<SharedState>,
    Form(form): Form<EmissionsForm>,
) -> Response {
    state.record_request();
    match state.estimate(&form) {
        Ok(result) => {
            debug!(emissions = result.emissions, fuel = %result.fuel_type, "form estimate");
            Html(render_page(&PageView::with_result(&form, &result))).into_response()
        }
        Err(err) => {
            debug!(field = ?err.field(), "rejected form submission: {}", err);
            let message = err.to_string();
            (
                StatusCode::BAD_REQUEST,
                Html(render_page(&PageView::with_error(&form, &message))),
            )
                .into_response()
        }
    }
}

async fn handle_api_emissions(
    State(state): State<SharedState>,
    payload: Result<Json<EmissionsForm>, JsonRejection>,
) -> Result<Json<EmissionsResult>, ApiError> {
    state.record_request();
    let Json(form) = payload.map_err(|rejection| {
        debug!("rejected API body: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;
    let result = state.estimate(&form).map_err(|err| {
        debug!(field = ?err.field(), "rejected API submission: {}", err);
        ApiError::from(err)
    })?;
    debug!(emissions = result.emissions, fuel = %result.fuel_type, "API estimate");
    Ok(Json(result))
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    state.record_request();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "co2calc",
        uptime_secs: state.uptime_seconds(),
    })
}

async fn handle_metrics(State(state): State<SharedState>) -> Response {
    let req_total = state.requests_total();
    let uptime = state.uptime_seconds();

    let mut metrics =
        "# HELP co2calc_http_requests_total Total number of requests handled\n".to_string();
    metrics.push_str("# TYPE co2calc_http_requests_total counter\n");
    metrics.push_str(&format!("co2calc_http_requests_total {req_total}\n"));
    metrics.push_str("# HELP co2calc_uptime_seconds Uptime of the server in seconds\n");
    metrics.push_str("# TYPE co2calc_uptime_seconds gauge\n");
    metrics.push_str(&format!("co2calc_uptime_seconds {uptime}\n"));

    let mut response = Response::new(Body::from(metrics));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        Arc::new(AppState::new(EmissionsCalculator::default()))
    }

    fn form_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/emissions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_renders_empty_form() {
        let response = build_router(test_state()).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<form method=\"post\" action=\"/\">"));
        assert!(!html.contains("Estimated emissions"));
    }

    #[tokio::test]
    async fn form_submission_renders_result() {
        let body = "distance=100&fuel_efficiency=10&fuel_type=gasoline&meat_consumption=0&lightbulbs=0";
        let response = build_router(test_state())
            .oneshot(form_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<strong>23.10 kg CO2</strong>"));
    }

    #[tokio::test]
    async fn unknown_fuel_submission_is_not_an_error() {
        let body = "distance=100&fuel_efficiency=10&fuel_type=steam&meat_consumption=1&lightbulbs=0";
        let response = build_router(test_state())
            .oneshot(form_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<strong>27.00 kg CO2</strong>"));
        assert!(html.contains("<option value=\"steam\" selected>Other</option>"));
    }

    #[tokio::test]
    async fn missing_form_field_is_bad_request() {
        let body = "distance=100&fuel_efficiency=10&fuel_type=gasoline&meat_consumption=0";
        let response = build_router(test_state())
            .oneshot(form_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("missing required field `lightbulbs`"));
        assert!(!html.contains("Estimated emissions"));
    }

    #[tokio::test]
    async fn zero_fuel_efficiency_is_bad_request() {
        let body = "distance=100&fuel_efficiency=0&fuel_type=diesel&meat_consumption=0&lightbulbs=0";
        let response = build_router(test_state())
            .oneshot(form_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("fuel efficiency must not be zero"));
        // The submitted values are kept in the form.
        assert!(html.contains("<option value=\"diesel\" selected>"));
    }

    #[tokio::test]
    async fn api_returns_breakdown() {
        let body = r#"{"distance": 200, "fuel_efficiency": 20, "fuel_type": "electric",
                       "meat_consumption": 1, "lightbulbs": 2}"#;
        let response = build_router(test_state())
            .oneshot(json_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let emissions = value["emissions"].as_f64().unwrap();
        assert!((emissions - 27.84).abs() < 1e-9);
        assert_eq!(value["breakdown"]["travel"].as_f64(), Some(0.0));
        assert_eq!(value["fuel_type"], "electric");
    }

    #[tokio::test]
    async fn api_rejects_non_numeric_input() {
        let body = r#"{"distance": "far", "fuel_efficiency": 20, "fuel_type": "diesel",
                       "meat_consumption": 1, "lightbulbs": 2}"#;
        let response = build_router(test_state())
            .oneshot(json_post(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(value["error"].as_str().unwrap().contains("`distance`"));
    }

    #[tokio::test]
    async fn api_rejects_non_scalar_fields_with_json_error() {
        for distance in ["true", "[1]", r#"{"km": 1}"#] {
            let body = format!(
                r#"{{"distance": {distance}, "fuel_efficiency": 20, "fuel_type": "diesel",
                    "meat_consumption": 1, "lightbulbs": 2}}"#
            );
            let response = build_router(test_state())
                .oneshot(json_post(&body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{distance}");

            let value: serde_json::Value =
                serde_json::from_str(&body_text(response).await).unwrap();
            assert!(value["error"].as_str().unwrap().contains("`distance`"));
        }
    }

    #[tokio::test]
    async fn api_rejects_malformed_json_with_json_error() {
        let response = build_router(test_state())
            .oneshot(json_post(r#"{"distance": 1,"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let body = format!("distance={}", "1".repeat(MAX_BODY_BYTES + 1));
        let mut request = form_post(&body);
        request
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_service() {
        let response = build_router(test_state())
            .oneshot(get("/api/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], "co2calc");
    }

    #[tokio::test]
    async fn metrics_count_requests() {
        let state = test_state();
        let app = build_router(state.clone());
        app.clone().oneshot(get("/")).await.unwrap();
        app.clone().oneshot(get("/api/health")).await.unwrap();

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
        let text = body_text(response).await;
        assert!(text.contains("co2calc_http_requests_total 2\n"));
        assert_eq!(state.requests_total(), 2);
    }
}
