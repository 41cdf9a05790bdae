pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::grid::handlers as grid_handlers;
use crate::remarks::handlers as remark_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Record browsers
        .route("/api/v1/:kind", get(grid_handlers::handle_browse))
        .route(
            "/api/v1/:kind/:id",
            get(remark_handlers::handle_get_record).delete(grid_handlers::handle_delete_record),
        )
        // Conversation log
        .route(
            "/api/v1/:kind/:id/remarks",
            post(remark_handlers::handle_append_remark),
        )
        .route(
            "/api/v1/:kind/:id/remarks/:sequence",
            delete(remark_handlers::handle_deactivate_remark),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::FixedOffset;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::backend::memory::InMemoryStore;
    use crate::config::Config;
    use crate::models::{Record, RecordKind, RemarkStatus};

    fn config() -> Config {
        Config {
            backend_url: "http://backend.invalid".to_string(),
            backend_token: None,
            backend_timeout_secs: 5,
            port: 0,
            rust_log: "debug".to_string(),
            default_page_size: 2,
            reminder_offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn leads() -> Vec<Record> {
        [
            json!({ "_id": "l1", "name": "Asha", "company": "JIFSA",
                    "createdAt": "2024-01-01T09:00:00Z",
                    "remarks": [
                        { "sequenceNumber": 1, "status": "pending", "message": "called",
                          "createdAt": "2024-01-01T10:00:00Z" },
                        { "sequenceNumber": 2, "status": "rejected", "message": "not now",
                          "createdAt": "2024-01-02T10:00:00Z" }
                    ] }),
            json!({ "_id": "l2", "name": "Bala", "company": "Bvoc",
                    "createdAt": "2024-01-03T09:00:00Z" }),
            json!({ "_id": "l3", "name": "Chitra", "company": "JIFSA",
                    "createdAt": "2024-01-02T09:00:00Z", "remarks": null }),
        ]
        .into_iter()
        .filter_map(Record::from_value)
        .collect()
    }

    fn app_with(kind: RecordKind, records: Vec<Record>) -> (Router, AppState) {
        let store = Arc::new(InMemoryStore::with_records(kind, records));
        let state = AppState::new(store, config());
        (build_router(state.clone()), state)
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_browse_defaults_to_newest_first() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(app, "GET", "/api/v1/leads", None).await;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = body["page"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["l2", "l3"]);
        assert_eq!(body["page"]["totalPages"], 2);
        assert_eq!(body["sort"], json!({ "field": "createdAt", "direction": "desc" }));
        assert_eq!(body["next"], "page=2");
        assert_eq!(body["previous"], Value::Null);
        assert_eq!(body["page"]["items"][1]["conversation"]["state"], "active");
    }

    #[tokio::test]
    async fn test_browse_filters_and_exposes_toggle_links() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(
            app,
            "GET",
            "/api/v1/leads?company=jifsa&sort=createdAt&dir=desc&page=5",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"]["totalItems"], 2);
        assert_eq!(body["page"]["currentPage"], 1);
        assert_eq!(body["page"]["items"][1]["id"], "l1");
        assert_eq!(body["page"]["items"][1]["conversation"]["label"], "Closed");

        let created = body["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["key"] == "createdAt")
            .unwrap();
        assert_eq!(created["sorted"], "desc");
        assert_eq!(created["toggle"], "sort=createdAt&dir=asc&company=jifsa");
        let name = body["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["key"] == "name")
            .unwrap();
        assert_eq!(name["toggle"], "sort=name&dir=desc&company=jifsa");
    }

    #[tokio::test]
    async fn test_browse_offers_links_that_clear_search_and_filters() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(
            app,
            "GET",
            "/api/v1/leads?search=a&company=JIFSA&page=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["filters"],
            json!([{ "name": "company", "value": "JIFSA", "clear": "search=a" }])
        );
        assert_eq!(body["clearSearch"], "company=JIFSA");

        let (app, _) = app_with(RecordKind::Lead, leads());
        let (_, body) = call(app, "GET", "/api/v1/leads", None).await;
        assert_eq!(body["filters"], json!([]));
        assert_eq!(body["clearSearch"], Value::Null);
    }

    #[tokio::test]
    async fn test_browse_rejects_oversized_page_size() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(app, "GET", "/api/v1/leads?pageSize=500", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "pageSize");
    }

    #[tokio::test]
    async fn test_browse_rejects_bad_query_and_unknown_collection() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(app.clone(), "GET", "/api/v1/leads?sort=salary", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "sort");

        let (status, _) = call(app.clone(), "GET", "/api/v1/leads?from=2024-02-01&to=2024-01-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(app, "GET", "/api/v1/customers", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_detail_shows_conversation() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(app.clone(), "GET", "/api/v1/leads/l1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remarks"].as_array().unwrap().len(), 2);
        assert_eq!(body["conversation"]["state"], "closed");
        assert_eq!(body["conversation"]["endedAt"], "2024-01-02T10:00:00Z");
        assert_eq!(body["conversation"]["durationDays"], 1);

        let (status, body) = call(app.clone(), "GET", "/api/v1/leads/l3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["conversation"]["state"], "active");
        assert_eq!(body["conversation"]["startedAt"], Value::Null);

        let (status, _) = call(app, "GET", "/api/v1/leads/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_append_remark_reopens_closed_conversation() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/leads/l1/remarks",
            Some(json!({
                "status": "interested",
                "message": "Changed their mind",
                "reminderDate": "2099-01-01",
                "reminderTime": "10:30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let remarks = body["remarks"].as_array().unwrap();
        assert_eq!(remarks.len(), 3);
        assert_eq!(remarks[2]["sequenceNumber"], 3);
        assert_eq!(remarks[2]["author"], "Console Tester");
        assert_eq!(remarks[2]["reminderDate"], "2099-01-01T10:30:00Z");
        assert_eq!(remarks[2]["reminderState"], "upcoming");
        assert_eq!(body["conversation"]["state"], "active");
        assert_eq!(body["conversation"]["latestStatus"], "interested");
    }

    #[tokio::test]
    async fn test_invalid_remark_never_reaches_backend() {
        let (app, state) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/leads/l2/remarks",
            Some(json!({ "status": "pending", "message": "ok", "reminderTime": "10:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "reminderDate");
        assert_eq!(body["error"]["message"], "date is required when time is set");

        let stored = state.store.list_records(RecordKind::Lead).await.unwrap();
        let l2 = stored.iter().find(|r| r.id == "l2").unwrap();
        assert!(l2.remarks.is_empty());
    }

    #[tokio::test]
    async fn test_second_submission_in_flight_is_refused() {
        let (app, state) = app_with(RecordKind::Lead, leads());
        let _held = state.submissions.try_begin(RecordKind::Lead, "l2").unwrap();
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/leads/l2/remarks",
            Some(json!({ "status": "pending", "message": "double click" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_guard_is_released_after_submission() {
        let (app, state) = app_with(RecordKind::Lead, leads());
        let (status, _) = call(
            app,
            "POST",
            "/api/v1/leads/l2/remarks",
            Some(json!({ "status": "not_reachable", "message": "no answer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!state.submissions.is_in_flight(RecordKind::Lead, "l2"));
    }

    #[tokio::test]
    async fn test_soft_deleting_terminal_remark_reopens() {
        let (app, state) = app_with(RecordKind::Lead, leads());
        let (status, body) = call(app, "DELETE", "/api/v1/leads/l1/remarks/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remarks"].as_array().unwrap().len(), 1);
        assert_eq!(body["conversation"]["state"], "active");

        // still stored for audit
        let stored = state.store.list_records(RecordKind::Lead).await.unwrap();
        let l1 = stored.iter().find(|r| r.id == "l1").unwrap();
        assert_eq!(l1.remarks.len(), 2);
        assert_eq!(l1.remarks[1].status, RemarkStatus::Rejected);
        assert!(!l1.remarks[1].is_active);
    }

    #[tokio::test]
    async fn test_hard_delete_only_for_intern_applications() {
        let (app, _) = app_with(RecordKind::Lead, leads());
        let (status, _) = call(app, "DELETE", "/api/v1/leads/l1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let applications = vec![Record::from_value(json!({
            "_id": "ia1", "fullName": "Dev", "createdAt": "2024-01-01"
        }))
        .unwrap()];
        let (app, state) = app_with(RecordKind::InternApplication, applications);
        let (status, _) = call(app.clone(), "DELETE", "/api/v1/intern-applications/ia1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state
            .store
            .list_records(RecordKind::InternApplication)
            .await
            .unwrap()
            .is_empty());

        let (status, _) = call(app, "DELETE", "/api/v1/intern-applications/ia1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remarks_rejected_for_social_posts() {
        let (app, _) = app_with(RecordKind::SocialPost, Vec::new());
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/social-posts/p1/remarks",
            Some(json!({ "status": "pending", "message": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "kind");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(RecordKind::Lead, Vec::new());
        let (status, body) = call(app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "crm-console");
    }
}
