//! Flight accessor against a real schema, using in-memory SQLite.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use flight_delay_backend::db::flights::{self, FlightUpdate, NewFlight};
use flight_delay_backend::entities::{delay_prediction, flight_status};
use flight_delay_backend::AppError;

async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn new_flight(number: i32, day: u32) -> NewFlight {
    NewFlight {
        airline_code: "AA".to_string(),
        flight_number: number,
        origin_airport: "ORD".to_string(),
        dest_airport: "JFK".to_string(),
        scheduled_departure_time: at(day, 8),
        scheduled_arrival_time: at(day, 11),
        elapsed_time: Some(140),
        distance: Some(740),
    }
}

#[tokio::test]
async fn test_create_then_get() {
    let db = setup_db().await;

    let created = flights::create(&db, new_flight(123, 1)).await.unwrap();
    assert_eq!(created.flight_id.len(), 36);

    let fetched = flights::get(&db, &created.flight_id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.airline_code, "AA");
    assert_eq!(fetched.flight_number, 123);
    assert_eq!(fetched.scheduled_departure_time, at(1, 8));
    assert_eq!(fetched.distance, Some(740));
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let db = setup_db().await;
    assert!(flights::get(&db, "no-such-flight").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_orders_by_departure() {
    let db = setup_db().await;
    for (number, day) in [(1, 3), (2, 1), (3, 2)] {
        flights::create(&db, new_flight(number, day)).await.unwrap();
    }

    let listed = flights::list(&db, None).await.unwrap();
    let numbers: Vec<_> = listed.iter().map(|f| f.flight_number).collect();
    assert_eq!(numbers, [1, 3, 2]);

    assert_eq!(flights::list(&db, Some(2)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_airline_is_a_persistence_error() {
    let db = setup_db().await;
    let mut flight = new_flight(9, 1);
    flight.airline_code = "ZZ".to_string();

    let err = flights::create(&db, flight).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
}

#[tokio::test]
async fn test_update_writes_only_given_fields() {
    let db = setup_db().await;
    let created = flights::create(&db, new_flight(123, 1)).await.unwrap();

    let changes: FlightUpdate = serde_json::from_value(serde_json::json!({
        "flightId": "ignored",
        "destAirport": "LAX",
        "distance": 1745
    }))
    .unwrap();
    let updated = flights::update(&db, &created.flight_id, changes)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.flight_id, created.flight_id);
    assert_eq!(updated.dest_airport, "LAX");
    assert_eq!(updated.distance, Some(1745));
    assert_eq!(updated.origin_airport, "ORD");
    assert_eq!(updated.elapsed_time, Some(140));
}

#[tokio::test]
async fn test_update_missing_flight_is_none() {
    let db = setup_db().await;
    let changes: FlightUpdate =
        serde_json::from_value(serde_json::json!({ "distance": 10 })).unwrap();

    assert!(flights::update(&db, "missing", changes).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_cannot_make_route_circular() {
    let db = setup_db().await;
    let created = flights::create(&db, new_flight(123, 1)).await.unwrap();
    let changes: FlightUpdate =
        serde_json::from_value(serde_json::json!({ "destAirport": "ORD" })).unwrap();

    let err = flights::update(&db, &created.flight_id, changes).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_delete_removes_statuses_and_predictions() {
    let db = setup_db().await;
    let created = flights::create(&db, new_flight(123, 1)).await.unwrap();
    let other = flights::create(&db, new_flight(456, 1)).await.unwrap();

    for (status_id, flight_id) in [("S1", &created.flight_id), ("S2", &other.flight_id)] {
        flight_status::ActiveModel {
            status_id: Set(status_id.to_string()),
            flight_id: Set(flight_id.clone()),
            flight_date: Set(at(1, 0).date()),
            departure_delay: Set(Some(45.0)),
            cancelled: Set(false),
            diverted: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
    }
    delay_prediction::ActiveModel {
        prediction_id: Set("P1".to_string()),
        flight_id: Set(created.flight_id.clone()),
        prediction_time: Set(at(1, 7)),
        predicted_departure_delay: Set(Some(49.5)),
        notification_sent: Set(false),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    assert!(flights::delete(&db, &created.flight_id).await.unwrap());

    assert!(flights::get(&db, &created.flight_id).await.unwrap().is_none());
    let statuses = flight_status::Entity::find()
        .filter(flight_status::Column::FlightId.eq(created.flight_id.as_str()))
        .count(&db)
        .await
        .unwrap();
    let predictions = delay_prediction::Entity::find()
        .filter(delay_prediction::Column::FlightId.eq(created.flight_id.as_str()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!((statuses, predictions), (0, 0));

    // The other flight's status is untouched
    assert_eq!(flight_status::Entity::find().count(&db).await.unwrap(), 1);

    assert!(!flights::delete(&db, &created.flight_id).await.unwrap());
}

#[tokio::test]
async fn test_status_overview_nests_flight() {
    let db = setup_db().await;
    let created = flights::create(&db, new_flight(123, 1)).await.unwrap();
    flight_status::ActiveModel {
        status_id: Set("S1".to_string()),
        flight_id: Set(created.flight_id.clone()),
        flight_date: Set(at(1, 0).date()),
        departure_delay: Set(Some(31.0)),
        cancelled: Set(false),
        diverted: Set(false),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let overview = flights::statuses(&db).await.unwrap();
    assert_eq!(overview.len(), 1);

    let json = serde_json::to_value(&overview[0]).unwrap();
    assert_eq!(json["statusId"], "S1");
    assert_eq!(json["displayStatus"], "Delayed");
    assert_eq!(json["flight"]["flightNumber"], 123);
}
