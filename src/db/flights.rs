use sea_orm::prelude::{Date, DateTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait, Value,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{delay_prediction, flight, flight_status};
use crate::error::{AppError, AppResult};
use crate::utils::designator::FlightDesignator;
use crate::utils::status::{DelayBreakdown, DelayReason, DisplayStatus};

pub const DEFAULT_LIST_LIMIT: u64 = 100;
pub const MAX_LIST_LIMIT: u64 = 1000;
const STATUS_OVERVIEW_LIMIT: u64 = 20;
const SEARCH_LIMIT: u64 = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlight {
    pub airline_code: String,
    pub flight_number: i32,
    pub origin_airport: String,
    pub dest_airport: String,
    pub scheduled_departure_time: DateTime,
    pub scheduled_arrival_time: DateTime,
    pub elapsed_time: Option<i32>,
    pub distance: Option<i32>,
}

/// Columns a client may change. `flightId` is accepted and ignored; any
/// other field is rejected when the body is parsed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlightUpdate {
    #[serde(default, rename = "flightId")]
    _flight_id: Option<IgnoredAny>,
    pub airline_code: Option<String>,
    pub flight_number: Option<i32>,
    pub origin_airport: Option<String>,
    pub dest_airport: Option<String>,
    pub scheduled_departure_time: Option<DateTime>,
    pub scheduled_arrival_time: Option<DateTime>,
    pub elapsed_time: Option<i32>,
    pub distance: Option<i32>,
}

impl FlightUpdate {
    pub fn is_empty(&self) -> bool {
        self.airline_code.is_none()
            && self.flight_number.is_none()
            && self.origin_airport.is_none()
            && self.dest_airport.is_none()
            && self.scheduled_departure_time.is_none()
            && self.scheduled_arrival_time.is_none()
            && self.elapsed_time.is_none()
            && self.distance.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverview {
    #[serde(flatten)]
    pub status: flight_status::Model,
    pub flight: Option<flight::Model>,
    pub display_status: DisplayStatus,
}

/// A flight row joined with its airline name.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub flight_id: String,
    pub airline_code: String,
    pub flight_number: i32,
    pub origin_airport: String,
    pub dest_airport: String,
    pub scheduled_departure_time: DateTime,
    pub scheduled_arrival_time: DateTime,
    pub elapsed_time: Option<i32>,
    pub distance: Option<i32>,
    pub airline_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetailRow {
    pub flight_id: String,
    pub airline_code: String,
    pub flight_number: i32,
    pub origin_airport: String,
    pub dest_airport: String,
    pub scheduled_departure_time: DateTime,
    pub scheduled_arrival_time: DateTime,
    pub elapsed_time: Option<i32>,
    pub distance: Option<i32>,
    pub airline_name: String,
    pub origin_airport_name: String,
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub dest_airport_name: String,
    pub dest_city: Option<String>,
    pub dest_state: Option<String>,
    pub status_id: Option<String>,
    pub flight_date: Option<Date>,
    pub actual_departure_time: Option<DateTime>,
    pub actual_arrival_time: Option<DateTime>,
    pub departure_delay: Option<f64>,
    pub arrival_delay: Option<f64>,
    pub cancelled: Option<bool>,
    pub diverted: Option<bool>,
    pub weather_delay: Option<f64>,
    pub carrier_delay: Option<f64>,
    pub nas_delay: Option<f64>,
    pub security_delay: Option<f64>,
    pub late_aircraft_delay: Option<f64>,
    pub prediction_id: Option<String>,
    pub predicted_departure_delay: Option<f64>,
    pub predicted_arrival_delay: Option<f64>,
    pub prediction_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetail {
    #[serde(flatten)]
    pub row: FlightDetailRow,
    pub delay_reason: Option<DelayReason>,
}

impl From<FlightDetailRow> for FlightDetail {
    fn from(row: FlightDetailRow) -> Self {
        let delay_reason = DelayBreakdown {
            weather: row.weather_delay,
            carrier: row.carrier_delay,
            nas: row.nas_delay,
            security: row.security_delay,
            late_aircraft: row.late_aircraft_delay,
        }
        .reason();
        Self { row, delay_reason }
    }
}

const SUMMARY_COLUMNS: &str = "f.flightId AS flight_id, f.airlineCode AS airline_code, \
    f.flightNumber AS flight_number, f.originAirport AS origin_airport, \
    f.destAirport AS dest_airport, f.scheduledDepartureTime AS scheduled_departure_time, \
    f.scheduledArrivalTime AS scheduled_arrival_time, f.elapsedTime AS elapsed_time, \
    f.distance AS distance, a.name AS airline_name";

pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

/// Most recently scheduled flights first
pub async fn list(db: &DatabaseConnection, limit: Option<u64>) -> AppResult<Vec<flight::Model>> {
    let flights = flight::Entity::find()
        .order_by_desc(flight::Column::ScheduledDepartureTime)
        .limit(clamp_limit(limit))
        .all(db)
        .await?;

    Ok(flights)
}

pub async fn get(db: &DatabaseConnection, flight_id: &str) -> AppResult<Option<flight::Model>> {
    Ok(flight::Entity::find_by_id(flight_id).one(db).await?)
}

pub async fn create(db: &DatabaseConnection, new: NewFlight) -> AppResult<flight::Model> {
    if new.origin_airport == new.dest_airport {
        return Err(AppError::Validation(
            "Origin and destination must be different".to_string(),
        ));
    }

    let flight = flight::ActiveModel {
        flight_id: Set(Uuid::new_v4().to_string()),
        airline_code: Set(new.airline_code),
        flight_number: Set(new.flight_number),
        origin_airport: Set(new.origin_airport),
        dest_airport: Set(new.dest_airport),
        scheduled_departure_time: Set(new.scheduled_departure_time),
        scheduled_arrival_time: Set(new.scheduled_arrival_time),
        elapsed_time: Set(new.elapsed_time),
        distance: Set(new.distance),
    };

    let flight = flight.insert(db).await?;
    tracing::info!(flight_id = %flight.flight_id, "Flight created");
    Ok(flight)
}

/// Only the supplied columns are written.
pub async fn update(
    db: &DatabaseConnection,
    flight_id: &str,
    changes: FlightUpdate,
) -> AppResult<Option<flight::Model>> {
    if changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let Some(existing) = flight::Entity::find_by_id(flight_id).one(db).await? else {
        return Ok(None);
    };

    let origin = changes.origin_airport.as_ref().unwrap_or(&existing.origin_airport);
    let dest = changes.dest_airport.as_ref().unwrap_or(&existing.dest_airport);
    if origin == dest {
        return Err(AppError::Validation(
            "Origin and destination must be different".to_string(),
        ));
    }

    let mut flight: flight::ActiveModel = existing.into();
    if let Some(airline_code) = changes.airline_code {
        flight.airline_code = Set(airline_code);
    }
    if let Some(flight_number) = changes.flight_number {
        flight.flight_number = Set(flight_number);
    }
    if let Some(origin_airport) = changes.origin_airport {
        flight.origin_airport = Set(origin_airport);
    }
    if let Some(dest_airport) = changes.dest_airport {
        flight.dest_airport = Set(dest_airport);
    }
    if let Some(departure) = changes.scheduled_departure_time {
        flight.scheduled_departure_time = Set(departure);
    }
    if let Some(arrival) = changes.scheduled_arrival_time {
        flight.scheduled_arrival_time = Set(arrival);
    }
    if let Some(elapsed_time) = changes.elapsed_time {
        flight.elapsed_time = Set(Some(elapsed_time));
    }
    if let Some(distance) = changes.distance {
        flight.distance = Set(Some(distance));
    }

    Ok(Some(flight.update(db).await?))
}

/// Removes the flight with its statuses and predictions in one transaction.
/// Returns whether the flight existed.
pub async fn delete(db: &DatabaseConnection, flight_id: &str) -> AppResult<bool> {
    let txn = db.begin().await?;

    flight_status::Entity::delete_many()
        .filter(flight_status::Column::FlightId.eq(flight_id))
        .exec(&txn)
        .await?;
    delay_prediction::Entity::delete_many()
        .filter(delay_prediction::Column::FlightId.eq(flight_id))
        .exec(&txn)
        .await?;
    let result = flight::Entity::delete_by_id(flight_id).exec(&txn).await?;

    txn.commit().await?;

    let existed = result.rows_affected > 0;
    if existed {
        tracing::info!(flight_id = %flight_id, "Flight deleted");
    }
    Ok(existed)
}

/// Latest status reports with their flights.
pub async fn statuses(db: &DatabaseConnection) -> AppResult<Vec<StatusOverview>> {
    let rows = flight_status::Entity::find()
        .find_also_related(flight::Entity)
        .order_by_desc(flight_status::Column::FlightDate)
        .limit(STATUS_OVERVIEW_LIMIT)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(status, flight)| StatusOverview {
            display_status: DisplayStatus::classify(
                status.cancelled,
                status.diverted,
                status.departure_delay,
            ),
            status,
            flight,
        })
        .collect())
}

/// Every flight operating under the designator, most recent first.
pub async fn find_by_designator(
    db: &DatabaseConnection,
    designator: &FlightDesignator,
) -> AppResult<Vec<FlightSummary>> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} \
        FROM Flight f \
        JOIN Airline a ON f.airlineCode = a.airlineCode \
        WHERE f.airlineCode = ? AND f.flightNumber = ? \
        ORDER BY f.scheduledDepartureTime DESC \
        LIMIT {SEARCH_LIMIT}"
    );

    let flights = FlightSummary::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        sql,
        [
            designator.airline_code.clone().into(),
            designator.flight_number.into(),
        ],
    ))
    .all(db)
    .await?;

    Ok(flights)
}

/// Joined record for the latest departure under the designator.
pub async fn detail_by_designator(
    db: &DatabaseConnection,
    designator: &FlightDesignator,
) -> AppResult<Option<FlightDetail>> {
    let sql = "SELECT \
            f.flightId AS flight_id, f.airlineCode AS airline_code, f.flightNumber AS flight_number, \
            f.originAirport AS origin_airport, f.destAirport AS dest_airport, \
            f.scheduledDepartureTime AS scheduled_departure_time, \
            f.scheduledArrivalTime AS scheduled_arrival_time, \
            f.elapsedTime AS elapsed_time, f.distance AS distance, \
            a.name AS airline_name, \
            orig.name AS origin_airport_name, orig.city AS origin_city, orig.state AS origin_state, \
            dest.name AS dest_airport_name, dest.city AS dest_city, dest.state AS dest_state, \
            fs.statusId AS status_id, fs.flightDate AS flight_date, \
            fs.actualDepartureTime AS actual_departure_time, fs.actualArrivalTime AS actual_arrival_time, \
            fs.departureDelay AS departure_delay, fs.arrivalDelay AS arrival_delay, \
            fs.cancelled AS cancelled, fs.diverted AS diverted, \
            fs.weatherDelay AS weather_delay, fs.carrierDelay AS carrier_delay, fs.nasDelay AS nas_delay, \
            fs.securityDelay AS security_delay, fs.lateAircraftDelay AS late_aircraft_delay, \
            dp.predictionId AS prediction_id, dp.predictedDepartureDelay AS predicted_departure_delay, \
            dp.predictedArrivalDelay AS predicted_arrival_delay, dp.predictionReason AS prediction_reason \
        FROM Flight f \
        JOIN Airline a ON f.airlineCode = a.airlineCode \
        JOIN Airport orig ON f.originAirport = orig.airportCode \
        JOIN Airport dest ON f.destAirport = dest.airportCode \
        LEFT JOIN Flight_Status fs ON f.flightId = fs.flightId \
        LEFT JOIN Delay_Prediction dp ON f.flightId = dp.flightId \
        WHERE f.airlineCode = ? AND f.flightNumber = ? \
        ORDER BY f.scheduledDepartureTime DESC, fs.flightDate DESC, dp.predictionTime DESC \
        LIMIT 1";

    let row = FlightDetailRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        sql,
        [
            designator.airline_code.clone().into(),
            designator.flight_number.into(),
        ],
    ))
    .one(db)
    .await?;

    Ok(row.map(FlightDetail::from))
}

/// Substring match over id, airline, number, airports and airline name.
pub async fn search(db: &DatabaseConnection, query: &str) -> AppResult<Vec<FlightSummary>> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} \
        FROM Flight f \
        JOIN Airline a ON f.airlineCode = a.airlineCode \
        WHERE f.flightId LIKE ? \
            OR f.airlineCode LIKE ? \
            OR CAST(f.flightNumber AS CHAR) LIKE ? \
            OR f.originAirport LIKE ? \
            OR f.destAirport LIKE ? \
            OR a.name LIKE ? \
        ORDER BY f.scheduledDepartureTime DESC \
        LIMIT {SEARCH_LIMIT}"
    );
    let pattern = format!("%{query}%");

    let flights = FlightSummary::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        sql,
        std::iter::repeat_n(Value::from(pattern), 6),
    ))
    .all(db)
    .await?;

    Ok(flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, MockDatabase};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(250)), 250);
        assert_eq!(clamp_limit(Some(50_000)), 1000);
    }

    #[test]
    fn test_update_ignores_flight_id() {
        let changes: FlightUpdate =
            serde_json::from_value(json!({ "flightId": "other", "distance": 740 })).unwrap();
        assert_eq!(changes.distance, Some(740));
        assert!(!changes.is_empty());

        let changes: FlightUpdate = serde_json::from_value(json!({ "flightId": "x" })).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_update_rejects_unknown_columns() {
        let result = serde_json::from_value::<FlightUpdate>(json!({ "status": "Delayed" }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_update_issues_no_sql() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();

        let err = update(&db, "F1", FlightUpdate::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_same_airports() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let departure = DateTime::parse_from_str("2025-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();

        let err = create(
            &db,
            NewFlight {
                airline_code: "AA".into(),
                flight_number: 100,
                origin_airport: "ORD".into(),
                dest_airport: "ORD".into(),
                scheduled_departure_time: departure,
                scheduled_arrival_time: departure,
                elapsed_time: None,
                distance: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_detail_derives_delay_reason() {
        let departure = DateTime::parse_from_str("2025-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let row = FlightDetailRow {
            flight_id: "F1".into(),
            airline_code: "AA".into(),
            flight_number: 123,
            origin_airport: "ORD".into(),
            dest_airport: "JFK".into(),
            scheduled_departure_time: departure,
            scheduled_arrival_time: departure,
            elapsed_time: None,
            distance: None,
            airline_name: "American Airlines".into(),
            origin_airport_name: "O'Hare".into(),
            origin_city: Some("Chicago".into()),
            origin_state: Some("IL".into()),
            dest_airport_name: "JFK".into(),
            dest_city: None,
            dest_state: None,
            status_id: Some("S1".into()),
            flight_date: None,
            actual_departure_time: None,
            actual_arrival_time: None,
            departure_delay: Some(45.0),
            arrival_delay: None,
            cancelled: Some(false),
            diverted: Some(false),
            weather_delay: None,
            carrier_delay: Some(45.0),
            nas_delay: None,
            security_delay: None,
            late_aircraft_delay: None,
            prediction_id: None,
            predicted_departure_delay: None,
            predicted_arrival_delay: None,
            prediction_reason: None,
        };

        let detail = FlightDetail::from(row);
        assert_eq!(detail.delay_reason, Some(DelayReason::Carrier));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["delayReason"], "Carrier");
        assert_eq!(json["airlineName"], "American Airlines");
        assert_eq!(json["flightNumber"], 123);
    }

    #[tokio::test]
    async fn test_designator_lookup_binds_code_and_number() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();
        let designator = FlightDesignator::parse("aa123").unwrap();

        assert!(find_by_designator(&db, &designator).await.unwrap().is_empty());

        let log = db.into_transaction_log();
        let statement = format!("{:?}", log[0]);
        assert!(statement.contains("WHERE f.airlineCode = ? AND f.flightNumber = ?"));
        assert!(statement.contains("String(Some(\"AA\"))"));
        assert!(statement.contains("Int(Some(123))"));
    }

    #[tokio::test]
    async fn test_search_wraps_query_in_wildcards() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        search(&db, "Delta").await.unwrap();

        let statement = format!("{:?}", db.into_transaction_log()[0]);
        assert_eq!(statement.matches("%Delta%").count(), 6);
        assert!(statement.contains("LIMIT 20"));
    }
}
