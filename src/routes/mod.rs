use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{analysis, flights, procedures, reference};
use crate::middleware::logging::log_request;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let flight_routes = Router::new()
        .route("/", get(flights::list_flights).post(flights::create_flight))
        .route(
            "/{id}",
            get(flights::get_flight)
                .put(flights::update_flight)
                .delete(flights::delete_flight),
        );

    let reference_routes = Router::new()
        .route("/airlines", get(reference::list_airlines))
        .route("/airports", get(reference::list_airports))
        .route("/weather-events", get(reference::list_weather_events))
        .route("/search", get(reference::search))
        .route("/flight-statuses", get(flights::list_statuses));

    let analysis_routes = Router::new()
        .route("/weather-impact", get(analysis::weather_impact))
        .route("/temporal", get(analysis::temporal))
        .route("/airline-performance", get(analysis::airline_performance));

    let routine_routes = Router::new()
        .route("/stored-procedures", post(procedures::call_procedure))
        .route("/transactions", post(procedures::call_transaction));

    Router::new()
        .nest("/api/flights", flight_routes)
        .nest("/api/analysis", analysis_routes)
        .nest("/api", reference_routes.merge(routine_routes))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sea_orm::{DatabaseConnection, DbBackend, DbErr, MockDatabase, Value};
    use serde_json::{json, Value as Json};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(db: DatabaseConnection) -> Router {
        create_router(AppState {
            db: Arc::new(db),
            config: Config {
                database_url: "mysql://localhost/test".to_string(),
                db_max_connections: 1,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
                run_migrations: false,
            },
        })
    }

    fn empty_rows() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Json) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body: Json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
        (status, body)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        extract_response_body(app.oneshot(request).await.unwrap()).await
    }

    #[tokio::test]
    async fn test_procedure_requires_name() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let (status, body) = send(app(db), "POST", "/api/stored-procedures", Some(json!({ "params": {} }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Procedure name is required" }));
    }

    #[tokio::test]
    async fn test_transaction_requires_name() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let (status, body) = send(app(db), "POST", "/api/transactions", Some(json!({ "transactionName": "" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Transaction name is required" }));
    }

    #[tokio::test]
    async fn test_procedure_with_no_rows() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([empty_rows()])
            .into_connection();
        let (status, body) = send(
            app(db),
            "POST",
            "/api/stored-procedures",
            Some(json!({ "procedureName": "GetAirlinePerformanceMetrics", "params": {} })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "results": [], "resultSets": [] }));
    }

    #[tokio::test]
    async fn test_transaction_returns_first_result_set() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([vec![BTreeMap::from([("affectedFlights", Value::from(2i64))])]])
            .into_connection();
        let (status, body) = send(
            app(db),
            "POST",
            "/api/transactions",
            Some(json!({
                "transactionName": "BulkCancellationDueToWeather",
                "params": [
                    { "name": "p_airport_code", "value": "ORD" },
                    { "name": "p_cancellation_code", "value": "B" },
                    { "name": "p_weather_event_id", "value": "W1" }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], json!([{ "affectedFlights": 2 }]));
        assert_eq!(body["resultSets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_database_failure_is_500() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let (status, body) = send(app(db), "GET", "/api/analysis/temporal", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Database operation failed" }));
    }

    #[tokio::test]
    async fn test_unknown_flight_is_404() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([Vec::<crate::entities::flight::Model>::new()])
            .into_connection();
        let (status, body) = send(app(db), "GET", "/api/flights/missing", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Flight not found" }));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_field() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let (status, _) = send(
            app(db),
            "PUT",
            "/api/flights/F1",
            Some(json!({ "cancelled": true })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_empty_search_is_400() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let (status, body) = send(app(db), "GET", "/api/search?q=", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Search query is required" }));
    }
}
