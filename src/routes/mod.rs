//! Router assembly: game pages, JSON API, cached static assets, and the
//! middleware stack (panic recovery, HTTP tracing, gzip, request timeout).

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderValue},
    middleware::map_response,
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::ServerConfig;
use crate::state::AppState;

pub mod http;

const ASSETS_CACHE_CONTROL: &str = "public, max-age=86400";

/// Build the application router with:
/// - `/` redirecting to `/home`
/// - riddle pages and answer submission under `/riddles/:id`
/// - JSON API under `/api/v1/...`
/// - static files from `ASSETS_DIR` under `/assets` with a cache policy
pub fn build_router(state: Arc<AppState>, cfg: &ServerConfig) -> Router {
    let assets = Router::new()
        .nest_service("/assets", ServeDir::new(&cfg.assets_dir))
        .layer(map_response(cache_on_success));

    let app = Router::new()
        .route("/", get(http::http_root))
        .route("/home", get(http::http_home))
        .route("/riddles/:id", get(http::http_get_riddle))
        .route("/riddles/:id/answer", post(http::http_post_answer))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/schedule", get(http::http_get_schedule))
        .with_state(state)
        .merge(assets);

    with_middleware(app, cfg.request_timeout)
}

/// Only successful asset responses are cacheable; a 404 must not stick.
async fn cache_on_success(mut res: Response) -> Response {
    if res.status().is_success() {
        res.headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(ASSETS_CACHE_CONTROL));
    }
    res
}

/// Panic recovery, HTTP tracing, gzip and the per-request deadline.
fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::new())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use crate::domain::RiddleSet;
    use crate::protocol::ScheduleOut;
    use crate::state::Clock;

    const RIDDLES: &str = r#"{
      "start_date": "2024-01-01T00:00:00+01:00",
      "riddles": [
        { "title": "Le renard", "text": "Roux et rusé.", "answer": "Fox" },
        { "title": "Sans clé", "text": "Pas de réponse ici." },
        { "title": "La chouette", "text": "Elle veille la nuit.", "answer": "chouette" }
      ]
    }"#;

    fn app_at(now: chrono::DateTime<Utc>, assets_dir: &str) -> Router {
        let set = RiddleSet::from_json(RIDDLES).unwrap();
        let state = Arc::new(AppState::new(set).with_clock(Clock::Fixed(now)));
        let cfg = ServerConfig { assets_dir: assets_dir.into(), ..ServerConfig::default() };
        build_router(state, &cfg)
    }

    fn app(day: u32) -> Router {
        app_at(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(), "./assets")
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn answer(id: &str, answer: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/riddles/{id}/answer"))
            .header("content-type", "application/x-www-form-urlencoded")
            .header("HX-Request", "true")
            .body(Body::from(format!("answer={answer}")))
            .unwrap()
    }

    #[tokio::test]
    async fn root_redirects_home() {
        let resp = app(2).oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()[header::LOCATION], "/home");
    }

    #[tokio::test]
    async fn home_full_page_and_fragment() {
        let full = body_text(app(2).oneshot(get("/home")).await.unwrap()).await;
        assert!(full.contains("<!DOCTYPE html>"));
        assert!(full.contains("/riddles/0"));

        let req = Request::builder().uri("/home").header("HX-Request", "true").body(Body::empty()).unwrap();
        let frag = body_text(app(2).oneshot(req).await.unwrap()).await;
        assert!(!frag.contains("<!DOCTYPE html>"));
        assert!(frag.contains("Jouons"));
    }

    #[tokio::test]
    async fn riddle_status_codes() {
        assert_eq!(app(2).oneshot(get("/riddles/abc")).await.unwrap().status(), StatusCode::BAD_REQUEST);
        assert_eq!(app(2).oneshot(get("/riddles/7")).await.unwrap().status(), StatusCode::NOT_FOUND);
        assert_eq!(app(2).oneshot(get("/riddles/-1")).await.unwrap().status(), StatusCode::NOT_FOUND);

        let resp = app(2).oneshot(get("/riddles/0")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Le renard"));

        let locked = body_text(app(2).oneshot(get("/riddles/2")).await.unwrap()).await;
        assert!(locked.contains("verrouillée"));
    }

    #[tokio::test]
    async fn answer_flow() {
        let wrong = body_text(app(20).oneshot(answer("0", "loup")).await.unwrap()).await;
        assert!(wrong.contains("Mauvaise réponse"));

        let next = body_text(app(20).oneshot(answer("0", "+FOX+")).await.unwrap()).await;
        assert!(next.contains("Sans clé"));

        let misconfigured = body_text(app(20).oneshot(answer("1", "rien")).await.unwrap()).await;
        assert!(misconfigured.contains("Aucune réponse configurée"));

        let done = body_text(app(20).oneshot(answer("2", "Chouette")).await.unwrap()).await;
        assert!(done.contains("Bravo"));

        assert_eq!(app(20).oneshot(answer("9", "x")).await.unwrap().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn schedule_api() {
        let resp = app(9).oneshot(get("/api/v1/schedule")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let out: ScheduleOut = serde_json::from_str(&body_text(resp).await).unwrap();
        assert!(out.started);
        assert_eq!(out.unlocked_index, Some(1));
        assert_eq!(out.riddle_count, 3);
        assert_eq!(out.next_unlock_at, "2024-01-15T00:00:00+01:00");

        let before = app_at(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(), "./assets");
        let out: ScheduleOut =
            serde_json::from_str(&body_text(before.oneshot(get("/api/v1/schedule")).await.unwrap()).await).unwrap();
        assert!(!out.started);
        assert_eq!(out.unlocked_index, None);
    }

    #[tokio::test]
    async fn health() {
        let resp = app(2).oneshot(get("/api/v1/health")).await.unwrap();
        assert_eq!(body_text(resp).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn assets_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
        let app = app_at(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), dir.path().to_str().unwrap());
        let resp = app.oneshot(get("/assets/style.css")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], ASSETS_CACHE_CONTROL);
    }

    #[tokio::test]
    async fn missing_asset_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_at(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), dir.path().to_str().unwrap());
        let resp = app.oneshot(get("/assets/htmx.min.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_requests_time_out() {
        let slow = Router::new().route(
            "/slow",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "late"
            }),
        );
        let resp = with_middleware(slow, Duration::from_secs(1)).oneshot(get("/slow")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn html_is_gzipped_on_request() {
        let req = Request::builder()
            .uri("/home")
            .header(header::ACCEPT_ENCODING, "gzip")
            .body(Body::empty())
            .unwrap();
        let resp = app(2).oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::CONTENT_ENCODING], "gzip");
    }
}
