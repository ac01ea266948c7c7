pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::curation::handlers as curation;
use crate::customization::handlers as customization;
use crate::payout::handlers as payout;
use crate::planning::handlers as planning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Learning paths
        .route(
            "/api/v1/learning-paths/generate",
            post(planning::handle_generate),
        )
        .route("/api/v1/learning-paths/:id", get(planning::handle_get_plan))
        .route(
            "/api/v1/learning-paths/:id/customize",
            post(customization::handle_customize),
        )
        .route(
            "/api/v1/learning-paths/:id/validate",
            put(customization::handle_validate_path),
        )
        .route(
            "/api/v1/learning-paths/:id/progress",
            patch(customization::handle_progress),
        )
        .route(
            "/api/v1/learning-paths/:id/export",
            post(planning::handle_export),
        )
        // Content
        .route(
            "/api/v1/content/recommendations",
            get(curation::handle_recommendations),
        )
        .route("/api/v1/content/curate", post(curation::handle_curate))
        // Payout
        .route("/api/v1/payout/calculate", post(payout::handle_calculate))
        .route("/api/v1/payout/scenarios", get(payout::handle_scenarios))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::models::job::JobContext;
    use crate::state::tests::test_state;
    use crate::store::memory::MemoryPlanStore;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "pathway-api");
    }

    #[tokio::test]
    async fn test_recommendations_require_skill() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let response = app
            .oneshot(get("/api/v1/content/recommendations"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommendations_fall_back_to_synthetic_content() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let response = app
            .oneshot(get(
                "/api/v1/content/recommendations?skill=Rust&difficulty=intermediate&limit=3",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["skill"], "Rust");
        assert!(body["recommendations"].as_array().unwrap().len() <= 3);
    }

    #[tokio::test]
    async fn test_unknown_plan_is_404() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let uri = format!(
            "/api/v1/learning-paths/{}?user_id={}",
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_then_fetch() {
        let store = Arc::new(MemoryPlanStore::new());
        let user_id = Uuid::new_v4();
        let job_id = Uuid::new_v4();
        store
            .add_job(JobContext {
                job_id,
                job_title: "Frontend Engineer".to_string(),
                company_name: "Acme".to_string(),
                required_skills: vec!["React".to_string()],
                candidate_skills: vec![],
            })
            .await;

        let app = build_router(test_state(store.clone()));
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/learning-paths/generate",
                json!({ "user_id": user_id, "job_id": job_id, "duration_weeks": 4 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["cached"], false);
        let plan_id = body["plan"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(get(&format!(
                "/api/v1/learning-paths/{plan_id}?user_id={user_id}"
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["intensity"], "intensive");
    }

    #[tokio::test]
    async fn test_invalid_duration_is_400() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let response = app
            .oneshot(post_json(
                "/api/v1/learning-paths/generate",
                json!({
                    "user_id": Uuid::new_v4(),
                    "job_id": Uuid::new_v4(),
                    "duration_weeks": 0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payout_calculate_within_bounds() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let response = app
            .oneshot(post_json(
                "/api/v1/payout/calculate",
                json!({
                    "user_id": Uuid::new_v4(),
                    "timeline_weeks": 2,
                    "content_difficulty": 9.0,
                    "user_skill_level": 3.0,
                    "stake_amount": 50.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let multiplier = body["result"]["final_multiplier"].as_f64().unwrap();
        assert!((0.5..=5.0).contains(&multiplier));
    }

    #[tokio::test]
    async fn test_payout_scenarios() {
        let app = build_router(test_state(Arc::new(MemoryPlanStore::new())));
        let uri = format!(
            "/api/v1/payout/scenarios?user_id={}&timeline_weeks=8&content_difficulty=6&user_skill_level=5",
            Uuid::new_v4()
        );
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["scenarios"].as_array().unwrap().len(), 5);
        assert_eq!(body["scenarios"][1]["name"], "Current Plan");
    }
}
