use actix_web::{web, HttpResponse, Result};
use serde_json::Value;

use crate::models::{ErrorResponse, SearchResponse};
use crate::AppState;

/// `POST /api/search`: forward one query string to the upstream capability
/// and wrap whatever comes back in the fixed envelope.
///
/// Validation is type/presence only. An empty string is a legitimate query
/// here even though the page blocks empty submissions client-side.
pub async fn search(state: web::Data<AppState>, body: web::Json<Value>) -> Result<HttpResponse> {
    let query = match body.get("query").and_then(Value::as_str) {
        Some(query) => query.to_owned(),
        None => {
            return Ok(
                HttpResponse::BadRequest().json(ErrorResponse::new("Invalid search query"))
            );
        }
    };

    match state.search_service.search(&query).await {
        Ok(results) => Ok(HttpResponse::Ok().json(SearchResponse {
            success: true,
            results,
            query,
        })),
        Err(e) => {
            tracing::error!("Search API error: {:?}", e);
            Ok(
                HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                    "Search failed",
                    e.to_string(),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use anyhow::anyhow;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Instant;

    use crate::config::Config;
    use crate::models::SearchResult;
    use crate::routes::api;
    use crate::services::{MockSearchBackend, SearchService};
    use crate::AppState;

    fn test_state(backend: MockSearchBackend) -> web::Data<AppState> {
        web::Data::new(AppState {
            search_service: SearchService::with_backend(Arc::new(backend), 10),
            config: Config::default(),
            start_time: Instant::now(),
        })
    }

    macro_rules! test_app {
        ($backend:expr) => {
            test::init_service(
                App::new()
                    .app_data(test_state($backend))
                    .service(api::config()),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn echoes_query_and_preserves_result_order() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_fetch()
            .withf(|query, count| query == "rust vs go" && *count == 10)
            .returning(|_, _| {
                Ok(vec![SearchResult {
                    name: "X".into(),
                    snippet: "Y".into(),
                    host_name: "example.com".into(),
                    rank: 1,
                    date: "2024-01-01".into(),
                }])
            });
        let app = test_app!(backend);

        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(json!({ "query": "rust vs go" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "results": [{
                    "name": "X",
                    "snippet": "Y",
                    "host_name": "example.com",
                    "rank": 1,
                    "date": "2024-01-01"
                }],
                "query": "rust vs go"
            })
        );
    }

    #[actix_web::test]
    async fn empty_upstream_reply_is_an_empty_array() {
        let mut backend = MockSearchBackend::new();
        backend.expect_fetch().returning(|_, _| Ok(Vec::new()));
        let app = test_app!(backend);

        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(json!({ "query": "nothing out there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["success"], json!(true));
    }

    #[actix_web::test]
    async fn empty_string_query_still_reaches_the_upstream() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_fetch()
            .withf(|query, _| query.is_empty())
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let app = test_app!(backend);

        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(json!({ "query": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["query"], json!(""));
    }

    #[rstest]
    #[case::missing_field(json!({}))]
    #[case::number(json!({ "query": 42 }))]
    #[case::null(json!({ "query": null }))]
    #[case::array(json!({ "query": ["rust"] }))]
    #[actix_web::test]
    async fn rejects_missing_or_non_string_query(#[case] payload: Value) {
        let app = test_app!(MockSearchBackend::new());

        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid search query" }));
    }

    #[actix_web::test]
    async fn upstream_failure_surfaces_the_error_message() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_fetch()
            .returning(|_, _| Err(anyhow!("quota exceeded")));
        let app = test_app!(backend);

        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(json!({ "query": "anything" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Search failed", "message": "quota exceeded" })
        );
    }
}
