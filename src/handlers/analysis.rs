use axum::{extract::State, Json};

use crate::db::analytics::{self, AirlinePerformanceRow, TemporalRow, WeatherImpactRow};
use crate::error::AppResult;
use crate::AppState;

pub async fn weather_impact(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WeatherImpactRow>>> {
    Ok(Json(analytics::weather_impact(&state.db).await?))
}

/// Delay causes by scheduled departure hour
pub async fn temporal(State(state): State<AppState>) -> AppResult<Json<Vec<TemporalRow>>> {
    Ok(Json(analytics::temporal(&state.db).await?))
}

pub async fn airline_performance(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AirlinePerformanceRow>>> {
    Ok(Json(analytics::airline_performance(&state.db).await?))
}
