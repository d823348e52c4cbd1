use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::flights::{self, FlightUpdate, NewFlight, StatusOverview};
use crate::entities::flight;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListFlightsQuery {
    pub limit: Option<u64>,
}

/// List flights, latest departure first
pub async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<ListFlightsQuery>,
) -> AppResult<Json<Vec<flight::Model>>> {
    let flights = flights::list(&state.db, query.limit).await?;
    Ok(Json(flights))
}

pub async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<flight::Model>> {
    let flight = flights::get(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    Ok(Json(flight))
}

pub async fn create_flight(
    State(state): State<AppState>,
    Json(payload): Json<NewFlight>,
) -> AppResult<Json<flight::Model>> {
    let flight = flights::create(&state.db, payload).await?;
    Ok(Json(flight))
}

pub async fn update_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<FlightUpdate>,
) -> AppResult<Json<flight::Model>> {
    let flight = flights::update(&state.db, &id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    Ok(Json(flight))
}

/// Delete a flight together with its statuses and predictions
pub async fn delete_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    if !flights::delete(&state.db, &id).await? {
        return Err(AppError::NotFound("Flight not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Flight deleted" })))
}

/// Latest status reports
pub async fn list_statuses(State(state): State<AppState>) -> AppResult<Json<Vec<StatusOverview>>> {
    Ok(Json(flights::statuses(&state.db).await?))
}
