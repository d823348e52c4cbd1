use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::reference::{self, SearchResults};
use crate::entities::{airline, airport, weather_event};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn list_airlines(State(state): State<AppState>) -> AppResult<Json<Vec<airline::Model>>> {
    Ok(Json(reference::airlines(&state.db).await?))
}

pub async fn list_airports(State(state): State<AppState>) -> AppResult<Json<Vec<airport::Model>>> {
    Ok(Json(reference::airports(&state.db).await?))
}

pub async fn list_weather_events(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<weather_event::Model>>> {
    Ok(Json(reference::weather_events(&state.db).await?))
}

/// Flight designator lookup or free-text search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResults>> {
    Ok(Json(reference::search(&state.db, &query.q).await?))
}
