//! Fixed aggregate reports over flights, statuses and weather events.
//!
//! Each report is one parameterless query run against the live tables.
//! Output columns are cast so MySQL's DECIMAL aggregates decode as plain
//! numbers, and the aliases are the field names clients see.

use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;

use crate::error::AppResult;
use crate::utils::geo::{planar_distance_sql, DistanceBand, WEATHER_JOIN_RADIUS};

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct WeatherImpactRow {
    pub weather_type: String,
    pub weather_severity: Option<String>,
    pub distance_category: String,
    pub affected_flights: i64,
    pub avg_departure_delay: Option<f64>,
    pub avg_arrival_delay: Option<f64>,
    pub cancelled_flights: i64,
}

impl WeatherImpactRow {
    pub fn distance_band(&self) -> Option<DistanceBand> {
        DistanceBand::from_label(&self.distance_category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct TemporalRow {
    pub departure_hour: i64,
    pub total_flights: i64,
    pub avg_departure_delay: Option<f64>,
    pub carrier_delay_pct: Option<f64>,
    pub weather_delay_pct: Option<f64>,
    pub nas_delay_pct: Option<f64>,
    pub security_delay_pct: Option<f64>,
    pub late_aircraft_delay_pct: Option<f64>,
    pub avg_weather_delay_mins: Option<f64>,
    pub flights_near_weather: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct AirlinePerformanceRow {
    pub airline_name: String,
    pub avg_delay_normal: Option<f64>,
    pub avg_delay_weather: Option<f64>,
    pub delay_difference: f64,
    pub cancellation_pct_weather: Option<f64>,
    pub total_flights: i64,
}

pub async fn weather_impact(db: &DatabaseConnection) -> AppResult<Vec<WeatherImpactRow>> {
    let rows = WeatherImpactRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        weather_impact_sql(),
    ))
    .all(db)
    .await?;

    tracing::debug!(rows = rows.len(), "Weather impact analysis");
    Ok(rows)
}

pub async fn temporal(db: &DatabaseConnection) -> AppResult<Vec<TemporalRow>> {
    let rows = TemporalRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        temporal_sql(),
    ))
    .all(db)
    .await?;

    tracing::debug!(rows = rows.len(), "Temporal analysis");
    Ok(rows)
}

pub async fn airline_performance(
    db: &DatabaseConnection,
) -> AppResult<Vec<AirlinePerformanceRow>> {
    let rows = AirlinePerformanceRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        airline_performance_sql(),
    ))
    .all(db)
    .await?;

    tracing::debug!(rows = rows.len(), "Airline performance analysis");
    Ok(rows)
}

/// `100 * matching / total`, NULL when there are no rows.
fn percentage(condition: &str) -> String {
    format!(
        "CAST(ROUND(100.0 * SUM(CASE WHEN {condition} THEN 1 ELSE 0 END) / NULLIF(COUNT(*), 0), 2) AS DOUBLE)"
    )
}

pub fn weather_impact_sql() -> String {
    let distance = planar_distance_sql("a", "we");
    format!(
        "SELECT \
            we.type AS weather_type, \
            we.severity AS weather_severity, \
            {band} AS distance_category, \
            CAST(COUNT(fs.statusId) AS SIGNED) AS affected_flights, \
            CAST(ROUND(AVG(fs.departureDelay), 2) AS DOUBLE) AS avg_departure_delay, \
            CAST(ROUND(AVG(fs.arrivalDelay), 2) AS DOUBLE) AS avg_arrival_delay, \
            CAST(COALESCE(SUM(fs.cancelled), 0) AS SIGNED) AS cancelled_flights \
        FROM Weather_Event we \
        JOIN Airport a ON {distance} <= {radius} \
        JOIN Flight f ON f.originAirport = a.airportCode \
        JOIN Flight_Status fs ON f.flightId = fs.flightId AND DATE(fs.flightDate) = DATE(we.startTime) \
        WHERE fs.departureDelay > 0 OR fs.cancelled = 1 \
        GROUP BY we.type, we.severity, distance_category \
        ORDER BY weather_type, weather_severity, distance_category",
        band = DistanceBand::sql_case(&distance),
        radius = WEATHER_JOIN_RADIUS,
    )
}

pub fn temporal_sql() -> String {
    let near_weather = DistanceBand::From70To140Miles.within_sql(&planar_distance_sql("a", "we"));
    format!(
        "SELECT \
            CAST(HOUR(f.scheduledDepartureTime) AS SIGNED) AS departure_hour, \
            CAST(COUNT(fs.statusId) AS SIGNED) AS total_flights, \
            CAST(ROUND(AVG(fs.departureDelay), 2) AS DOUBLE) AS avg_departure_delay, \
            {carrier} AS carrier_delay_pct, \
            {weather} AS weather_delay_pct, \
            {nas} AS nas_delay_pct, \
            {security} AS security_delay_pct, \
            {late_aircraft} AS late_aircraft_delay_pct, \
            CAST(ROUND(AVG(CASE WHEN fs.weatherDelay > 0 THEN fs.weatherDelay ELSE NULL END), 2) AS DOUBLE) AS avg_weather_delay_mins, \
            CAST(COUNT(CASE WHEN EXISTS ( \
                SELECT 1 FROM Weather_Event we \
                WHERE {near_weather} \
                AND DATE(f.scheduledDepartureTime) = DATE(we.startTime) \
            ) THEN 1 ELSE NULL END) AS SIGNED) AS flights_near_weather \
        FROM Flight f \
        JOIN Flight_Status fs ON f.flightId = fs.flightId \
        JOIN Airport a ON f.originAirport = a.airportCode \
        WHERE fs.departureDelay > 0 \
        GROUP BY departure_hour \
        ORDER BY departure_hour",
        carrier = percentage("fs.carrierDelay > 0"),
        weather = percentage("fs.weatherDelay > 0"),
        nas = percentage("fs.nasDelay > 0"),
        security = percentage("fs.securityDelay > 0"),
        late_aircraft = percentage("fs.lateAircraftDelay > 0"),
    )
}

pub fn airline_performance_sql() -> String {
    let near_weather =
        DistanceBand::From140To210Miles.within_sql(&planar_distance_sql("a", "we"));
    format!(
        "SELECT \
            t.airline_name, \
            t.avg_delay_normal, \
            t.avg_delay_weather, \
            CAST(COALESCE(t.avg_delay_weather, 0) - COALESCE(t.avg_delay_normal, 0) AS DOUBLE) AS delay_difference, \
            t.cancellation_pct_weather, \
            t.total_flights \
        FROM ( \
            SELECT \
                al.name AS airline_name, \
                (SELECT CAST(ROUND(AVG(fs.departureDelay), 2) AS DOUBLE) \
                 FROM Flight f \
                 JOIN Flight_Status fs ON f.flightId = fs.flightId \
                 WHERE f.airlineCode = al.airlineCode \
                 AND NOT EXISTS ( \
                     SELECT 1 FROM Weather_Event we \
                     JOIN Airport a ON f.originAirport = a.airportCode \
                     WHERE DATE(fs.flightDate) = DATE(we.startTime) \
                     AND {near_weather} \
                 )) AS avg_delay_normal, \
                (SELECT CAST(ROUND(AVG(fs.departureDelay), 2) AS DOUBLE) \
                 FROM Flight f \
                 JOIN Flight_Status fs ON f.flightId = fs.flightId \
                 JOIN Airport a ON f.originAirport = a.airportCode \
                 JOIN Weather_Event we ON DATE(fs.flightDate) = DATE(we.startTime) \
                 WHERE f.airlineCode = al.airlineCode \
                 AND {near_weather} \
                ) AS avg_delay_weather, \
                CAST(ROUND(100.0 * COALESCE( \
                    (SELECT SUM(fs.cancelled) FROM Flight f \
                     JOIN Flight_Status fs ON f.flightId = fs.flightId \
                     JOIN Airport a ON f.originAirport = a.airportCode \
                     JOIN Weather_Event we ON DATE(fs.flightDate) = DATE(we.startTime) \
                     WHERE f.airlineCode = al.airlineCode \
                     AND {near_weather} \
                    ), 0) / NULLIF((SELECT COUNT(*) FROM Flight f WHERE f.airlineCode = al.airlineCode), 0), 2) AS DOUBLE) AS cancellation_pct_weather, \
                CAST((SELECT COUNT(*) FROM Flight f WHERE f.airlineCode = al.airlineCode) AS SIGNED) AS total_flights \
            FROM Airline al \
            WHERE EXISTS (SELECT 1 FROM Flight f WHERE f.airlineCode = al.airlineCode) \
        ) t \
        ORDER BY delay_difference DESC"
    )
}
