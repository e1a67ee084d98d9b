//! HTTP surface over the journal.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check (no identity required)
//! - everything under `/api`: resolved through the configured
//!   [`IdentityStrategy`]; the user lands in request extensions.

pub mod error;
mod handlers;
mod middleware;

pub use error::{ApiError, ErrorBody};

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::identity::IdentityStrategy;
use crate::journal::Journal;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub journal: Arc<Journal>,
    pub identity: Arc<IdentityStrategy>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(journal: Journal, identity: IdentityStrategy, clock: Clock) -> Self {
        Self {
            journal: Arc::new(journal),
            identity: Arc::new(identity),
            clock,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Public routes (no identity)
    let public_routes = Router::new().route("/health", get(handlers::health));

    let api_routes = Router::new()
        .route("/api/me", get(handlers::me))
        .route("/api/today", get(handlers::today))
        .route("/api/history", get(handlers::history))
        .route("/api/range", get(handlers::range))
        .route("/api/streak", get(handlers::streak))
        .route("/api/weight/history", get(handlers::weight_history))
        .route("/api/goal_projection", get(handlers::goal_projection))
        .route("/api/progress_card", get(handlers::progress_card))
        .route("/api/meal_history", get(handlers::meal_history))
        .route("/api/stats", get(handlers::stats))
        .route("/api/export_data", get(handlers::export_data))
        .route("/api/progress_photos", get(handlers::progress_photos))
        .route(
            "/api/meal-templates",
            get(handlers::list_templates).post(handlers::add_template),
        )
        .route("/api/meal-templates/{id}", delete(handlers::delete_template))
        .route(
            "/api/log-from-template/{id}",
            post(handlers::log_from_template),
        )
        .route("/api/add_meal", post(handlers::add_meal))
        .route("/api/delete_meal", post(handlers::delete_meal))
        .route("/api/weight", post(handlers::log_weight))
        .route("/api/workout", post(handlers::log_workout))
        .route("/api/update_goals", post(handlers::update_goals))
        .route("/api/save_goals", post(handlers::save_goals))
        .route("/api/calculate_goals", post(handlers::calculate_goals))
        .route("/api/clear_data", post(handlers::clear_data))
        .route(
            "/api/upload_progress_photo",
            post(handlers::upload_progress_photo),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::identity_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ApiKeyTable;
    use crate::store::{DocumentStore, UserId};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn clock() -> Clock {
        Clock::Fixed(
            NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn setup(identity: IdentityStrategy) -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(DocumentStore::new(temp_dir.path()));
        (router(AppState::new(journal, identity, clock())), temp_dir)
    }

    fn fixed() -> IdentityStrategy {
        IdentityStrategy::Fixed(UserId::parse("default").unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = setup(fixed());
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_log_meal_then_today() {
        let (app, _dir) = setup(fixed());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/add_meal",
                json!({"description": "Eggs", "calories": 300, "protein": 20}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let meal = body_json(response).await;
        assert_eq!(meal["time"], "12:00");
        assert_eq!(meal["protein"], 20);

        let response = app.oneshot(get_req("/api/today")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let today = body_json(response).await;
        assert_eq!(today["totals"]["calories"], 300);
        assert_eq!(today["meals"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let (app, _dir) = setup(fixed());
        let response = app
            .oneshot(post_json("/api/add_meal", json!({"calories": -5})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation");
        assert!(body["message"].as_str().unwrap().contains("calories"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (app, _dir) = setup(fixed());
        let request = Request::builder()
            .method("POST")
            .uri("/api/weight")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation");
    }

    #[tokio::test]
    async fn test_delete_missing_meal_is_not_found() {
        let (app, _dir) = setup(fixed());
        let response = app
            .oneshot(post_json("/api/delete_meal", json!({"index": 4})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_cookie_identity_is_minted_once() {
        let (app, _dir) = setup(IdentityStrategy::Cookie {
            name: "leanfit_uid".to_string(),
        });

        let response = app.clone().oneshot(get_req("/api/me")).await.unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("leanfit_uid="));
        assert!(set_cookie.contains("Max-Age=31536000"));

        let token = set_cookie
            .trim_start_matches("leanfit_uid=")
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert_eq!(body_json(response).await["user_id"], token.as_str());

        let request = Request::builder()
            .uri("/api/me")
            .header(header::COOKIE, format!("leanfit_uid={}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await["user_id"], token.as_str());
    }

    #[tokio::test]
    async fn test_api_key_identity() {
        let mut keys = ApiKeyTable::new();
        keys.insert("secret", UserId::parse("alice").unwrap());
        let (app, _dir) = setup(IdentityStrategy::ApiKey(keys));

        let response = app.clone().oneshot(get_req("/api/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "missing_auth");

        let request = Request::builder()
            .uri("/api/me")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user_id"], "alice");
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let (app, _dir) = setup(IdentityStrategy::Cookie {
            name: "leanfit_uid".to_string(),
        });

        let with_cookie = |uid: &str, req: Request<Body>| {
            let (mut parts, body) = req.into_parts();
            parts.headers.insert(
                header::COOKIE,
                format!("leanfit_uid={}", uid).parse().unwrap(),
            );
            Request::from_parts(parts, body)
        };

        app.clone()
            .oneshot(with_cookie(
                "alice",
                post_json("/api/add_meal", json!({"calories": 500})),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(with_cookie("bob", get_req("/api/today")))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["totals"]["calories"], 0);
    }

    #[tokio::test]
    async fn test_range_and_history() {
        let (app, _dir) = setup(fixed());
        app.clone()
            .oneshot(post_json(
                "/api/add_meal",
                json!({"calories": 800, "date": "2024-03-01"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get_req("/api/range?start=2024-03-01&end=2024-03-03"))
            .await
            .unwrap();
        let series = body_json(response).await;
        let calories: Vec<u64> = series
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["calories"].as_u64().unwrap())
            .collect();
        assert_eq!(calories, vec![800, 0, 0]);

        let response = app
            .clone()
            .oneshot(get_req("/api/history?days=3"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

        let response = app
            .oneshot(get_req("/api/range?start=yesterday&end=2024-03-03"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_goal_projection_requires_plan() {
        let (app, _dir) = setup(fixed());

        let response = app
            .clone()
            .oneshot(get_req("/api/goal_projection"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/save_goals",
                json!({
                    "started_date": "2024-03-01",
                    "starting_weight": 220,
                    "goal_weight": 200,
                    "target_date": "2024-06-01",
                    "daily_calorie_goal": 1900
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["daily_calorie_goal"], 1900);

        let response = app.oneshot(get_req("/api/goal_projection")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let projection = body_json(response).await;
        assert_eq!(projection["goal_weight"], 200.0);
        assert_eq!(projection["days_tracked"], 2);
    }

    #[tokio::test]
    async fn test_save_goals_rejects_ancient_start() {
        let (app, _dir) = setup(fixed());
        let response = app
            .oneshot(post_json(
                "/api/save_goals",
                json!({
                    "started_date": "0001-01-01",
                    "starting_weight": 220,
                    "goal_weight": 200,
                    "target_date": "2024-06-01",
                    "daily_calorie_goal": 1900
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation");
    }

    #[tokio::test]
    async fn test_weight_history_rejects_huge_days() {
        let (app, _dir) = setup(fixed());

        let response = app
            .clone()
            .oneshot(get_req("/api/weight/history?days=4000000000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation");

        let response = app
            .oneshot(get_req("/api/weight/history?days=30"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_calculate_goals() {
        let (app, _dir) = setup(fixed());
        let response = app
            .oneshot(post_json(
                "/api/calculate_goals",
                json!({
                    "current_weight": 200,
                    "goal_weight": 190,
                    "height_inches": 70,
                    "age": 35,
                    "activity_level": "light",
                    "timeline_weeks": 10
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let estimate = body_json(response).await;
        assert_eq!(estimate["daily_deficit"], -500);
        assert_eq!(estimate["recommended_protein"], 200);
    }

    #[tokio::test]
    async fn test_templates_and_clear() {
        let (app, dir) = setup(fixed());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/meal-templates",
                json!({"name": "Shake", "calories": 250, "protein": 40}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_u64().unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/log-from-template/{}", id),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/meal-templates/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post_json("/api/clear_data", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let backup = body_json(response).await["backup_file"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(backup.starts_with("20240303_120000"));
        assert!(!backup.contains('/'));
        assert!(dir
            .path()
            .join("backups")
            .join("default")
            .join(&backup)
            .exists());

        let response = app.oneshot(get_req("/api/stats")).await.unwrap();
        assert_eq!(body_json(response).await["total_meals"], 0);
    }
}
