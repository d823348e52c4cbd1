use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, JsonValue, RuntimeErr,
    TransactionTrait, Value,
};
use serde_json::json;
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::types::Decimal;
use sqlx::{Column, Connection, Either, Executor, MySql, Row, TypeInfo};

use crate::db::bridge::{RoutineArgs, RoutineCall, RoutineKind};
use crate::error::AppResult;

/// Rows returned by a routine, one entry per result set the server sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineOutput {
    pub result_sets: Vec<Vec<JsonValue>>,
}

impl RoutineOutput {
    /// The first result set, empty when the routine returned nothing
    pub fn first(&self) -> &[JsonValue] {
        self.result_sets.first().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Run a stored procedure in a single round trip.
pub async fn call_procedure(
    db: &DatabaseConnection,
    name: &str,
    args: &RoutineArgs,
) -> AppResult<RoutineOutput> {
    let call = build(name, args)?;
    if call.kind() == Some(RoutineKind::Transaction) {
        tracing::warn!(routine = %call.routine, "Transactional routine called outside a transaction");
    }

    let result = match mysql_pool(db) {
        Some(pool) => procedure_on_pool(pool, &call).await,
        None => fetch_single_set(db, &call).await,
    };
    let output = result.inspect_err(|err| {
        tracing::error!(routine = %call.routine, error = %err, "Stored procedure failed");
    })?;

    tracing::debug!(
        routine = %call.routine,
        result_sets = output.result_sets.len(),
        "Stored procedure completed"
    );
    Ok(output)
}

/// Run a routine inside its own transaction. Any failure rolls back before
/// the error is returned.
pub async fn call_transaction(
    db: &DatabaseConnection,
    name: &str,
    args: &RoutineArgs,
) -> AppResult<RoutineOutput> {
    let call = build(name, args)?;

    let result = match mysql_pool(db) {
        Some(pool) => transaction_on_pool(pool, &call).await,
        None => transaction_on_connection(db, &call).await,
    };
    let output = result.inspect_err(|err| {
        tracing::error!(routine = %call.routine, error = %err, "Transaction rolled back");
    })?;

    tracing::info!(
        routine = %call.routine,
        result_sets = output.result_sets.len(),
        "Transaction committed"
    );
    Ok(output)
}

fn build(name: &str, args: &RoutineArgs) -> AppResult<RoutineCall> {
    RoutineCall::build(name, args).inspect_err(|err| {
        tracing::warn!(routine = %name, error = %err, "Rejected routine call");
    })
}

/// Only a MySQL pool reports result-set boundaries.
fn mysql_pool(db: &DatabaseConnection) -> Option<&MySqlPool> {
    match db {
        DatabaseConnection::SqlxMySqlPoolConnection(_) => Some(db.get_mysql_connection_pool()),
        _ => None,
    }
}

async fn procedure_on_pool(pool: &MySqlPool, call: &RoutineCall) -> Result<RoutineOutput, DbErr> {
    let mut conn = pool.acquire().await.map_err(conn_err)?;
    fetch_result_sets(&mut conn, call).await
}

async fn transaction_on_pool(pool: &MySqlPool, call: &RoutineCall) -> Result<RoutineOutput, DbErr> {
    let mut conn = pool.acquire().await.map_err(conn_err)?;

    // Applies to the next transaction started on this session
    if let Some(level) = call.isolation() {
        let sql = format!("SET TRANSACTION ISOLATION LEVEL {level}");
        (&mut *conn).execute(sql.as_str()).await.map_err(exec_err)?;
    }

    let mut txn = conn.begin().await.map_err(exec_err)?;
    match fetch_result_sets(&mut txn, call).await {
        Ok(output) => {
            txn.commit().await.map_err(exec_err)?;
            Ok(output)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(routine = %call.routine, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn transaction_on_connection(
    db: &DatabaseConnection,
    call: &RoutineCall,
) -> Result<RoutineOutput, DbErr> {
    let txn = db.begin_with_config(call.isolation(), None).await?;
    match fetch_single_set(&txn, call).await {
        Ok(output) => {
            txn.commit().await?;
            Ok(output)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(routine = %call.routine, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn fetch_result_sets(
    conn: &mut MySqlConnection,
    call: &RoutineCall,
) -> Result<RoutineOutput, DbErr> {
    let items: Vec<Either<_, MySqlRow>> = conn
        .fetch_many(bind_values(call)?)
        .try_collect()
        .await
        .map_err(query_err)?;

    let result_sets = group_result_sets(items)
        .iter()
        .map(|set| set.iter().map(row_to_json).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RoutineOutput { result_sets })
}

/// Connections without result-set boundaries see every row as one set.
async fn fetch_single_set<C: ConnectionTrait>(
    conn: &C,
    call: &RoutineCall,
) -> Result<RoutineOutput, DbErr> {
    let rows = JsonValue::find_by_statement(call.statement(conn.get_database_backend()))
        .all(conn)
        .await?;

    let result_sets = if rows.is_empty() { Vec::new() } else { vec![rows] };
    Ok(RoutineOutput { result_sets })
}

fn bind_values(call: &RoutineCall) -> Result<Query<'_, MySql, MySqlArguments>, DbErr> {
    call.values
        .iter()
        .try_fold(sqlx::query(&call.sql), |query, value| {
            let query = match value {
                Value::Bool(v) => query.bind(*v),
                Value::BigInt(v) => query.bind(*v),
                Value::BigUnsigned(v) => query.bind(*v),
                Value::Double(v) => query.bind(*v),
                Value::String(v) => query.bind(v.as_deref().cloned()),
                other => {
                    return Err(DbErr::Custom(format!("Unsupported routine argument {other:?}")));
                }
            };
            Ok(query)
        })
}

/// Every `Left` closes a result set, empty or not. The last one is the
/// status of the `CALL` itself and never carries rows.
fn group_result_sets<D, R>(items: impl IntoIterator<Item = Either<D, R>>) -> Vec<Vec<R>> {
    let mut sets = Vec::new();
    let mut current = Vec::new();

    for item in items {
        match item {
            Either::Left(_) => sets.push(std::mem::take(&mut current)),
            Either::Right(row) => current.push(row),
        }
    }
    if !current.is_empty() {
        sets.push(current);
    }
    if sets.last().is_some_and(Vec::is_empty) {
        sets.pop();
    }

    sets
}

// Columns are read by position: the first result set of a prepared CALL
// arrives without a name index.
fn row_to_json(row: &MySqlRow) -> Result<JsonValue, DbErr> {
    let mut object = serde_json::Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = column_value(row, index, column.type_info().name()).map_err(query_err)?;
        object.insert(column.name().to_owned(), value);
    }
    Ok(JsonValue::Object(object))
}

fn column_value(row: &MySqlRow, index: usize, type_name: &str) -> Result<JsonValue, sqlx::Error> {
    let value = match type_name {
        "NULL" => JsonValue::Null,
        "BOOLEAN" => json!(row.try_get::<Option<bool>, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            json!(row.try_get::<Option<i64>, _>(index)?)
        }
        unsigned if unsigned.ends_with(" UNSIGNED") => json!(row.try_get::<Option<u64>, _>(index)?),
        "FLOAT" | "DOUBLE" => json!(row.try_get::<Option<f64>, _>(index)?),
        "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(index)?
            .map_or(JsonValue::Null, decimal_to_json),
        "DATE" => json!(row.try_get::<Option<NaiveDate>, _>(index)?),
        "DATETIME" | "TIMESTAMP" => json!(row.try_get::<Option<NaiveDateTime>, _>(index)?),
        "TIME" => json!(row.try_get::<Option<NaiveTime>, _>(index)?),
        _ => json!(row.try_get::<Option<String>, _>(index).ok().flatten()),
    };
    Ok(value)
}

fn decimal_to_json(value: Decimal) -> JsonValue {
    let text = value.to_string();
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(JsonValue::String(text), JsonValue::Number)
}

fn conn_err(err: sqlx::Error) -> DbErr {
    DbErr::Conn(RuntimeErr::SqlxError(err))
}

fn exec_err(err: sqlx::Error) -> DbErr {
    DbErr::Exec(RuntimeErr::SqlxError(err))
}

fn query_err(err: sqlx::Error) -> DbErr {
    DbErr::Query(RuntimeErr::SqlxError(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use sea_orm::{DbBackend, MockDatabase, Transaction};
    use std::collections::BTreeMap;

    fn delayed_flight(id: &str, delay: f64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("flightId", Value::from(id)),
            ("departureDelay", Value::from(delay)),
        ])
    }

    fn done() -> Either<(), JsonValue> {
        Either::Left(())
    }

    fn row(value: JsonValue) -> Either<(), JsonValue> {
        Either::Right(value)
    }

    #[test]
    fn test_empty_first_set_is_kept() {
        // No delayed flights: an empty listing followed by the summary row
        let summary = json!({ "total_delayed_flights": 0, "cancelled_flights": null });
        let output = RoutineOutput {
            result_sets: group_result_sets([done(), row(summary.clone()), done(), done()]),
        };

        assert_eq!(output.result_sets.len(), 2);
        assert!(output.first().is_empty());
        assert_eq!(output.result_sets[1], vec![summary]);
    }

    #[test]
    fn test_sets_with_same_columns_stay_apart() {
        let sets = group_result_sets([
            row(json!({ "a": 1 })),
            done(),
            row(json!({ "a": 2 })),
            done(),
            done(),
        ]);

        assert_eq!(sets, vec![vec![json!({ "a": 1 })], vec![json!({ "a": 2 })]]);
    }

    #[test]
    fn test_call_status_is_not_a_result_set() {
        assert!(group_result_sets([done()]).is_empty());
        assert_eq!(group_result_sets([done(), done()]), vec![Vec::<JsonValue>::new()]);
        assert!(RoutineOutput::default().first().is_empty());
    }

    #[test]
    fn test_decimal_becomes_number() {
        assert_eq!(decimal_to_json(Decimal::new(2200, 2)), json!(22.0));
        assert_eq!(decimal_to_json(Decimal::new(-125, 1)), json!(-12.5));
    }

    #[tokio::test]
    async fn test_call_procedure_binds_declared_order() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([vec![delayed_flight("F1", 45.0), delayed_flight("F2", 31.0)]])
            .into_connection();

        let args = RoutineArgs::new()
            .with("p_airline_code", "AA")
            .with("p_threshold", 30);
        let output = call_procedure(&db, "GetDelayedFlights", &args).await.unwrap();

        assert_eq!(output.result_sets.len(), 1);
        assert_eq!(
            output.first(),
            [
                json!({ "departureDelay": 45.0, "flightId": "F1" }),
                json!({ "departureDelay": 31.0, "flightId": "F2" }),
            ]
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DbBackend::MySql,
                "CALL GetDelayedFlights(?, ?, ?, ?, ?)",
                [
                    Value::BigInt(Some(30)),
                    Value::String(None),
                    Value::String(None),
                    Value::from("AA"),
                    Value::String(None),
                ],
            )]
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let output = call_procedure(&db, "GetAirlinePerformanceMetrics", &RoutineArgs::new())
            .await
            .unwrap();

        assert!(output.result_sets.is_empty());
        assert!(output.first().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_issues_no_sql() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();

        let err = call_procedure(&db, "", &RoutineArgs::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = call_transaction(&db, " ", &RoutineArgs::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_driver_error_passes_through() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_errors([DbErr::Custom("PROCEDURE does not exist".into())])
            .into_connection();

        let err = call_procedure(&db, "Missing", &RoutineArgs::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(DbErr::Custom(msg)) if msg.contains("does not exist")));
    }

    #[tokio::test]
    async fn test_transaction_commits() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([vec![BTreeMap::from([(
                "affectedFlights",
                Value::from(3i64),
            )])]])
            .into_connection();

        let args = RoutineArgs::new()
            .with("p_airport_code", "ORD")
            .with("p_cancellation_code", "B")
            .with("p_weather_event_id", 7);
        let output = call_transaction(&db, "BulkCancellationDueToWeather", &args)
            .await
            .unwrap();

        assert_eq!(output.first(), [json!({ "affectedFlights": 3 })]);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("CALL BulkCancellationDueToWeather(?, ?, ?)"));
    }

    #[tokio::test]
    async fn test_transaction_failure_rolls_back() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_errors([DbErr::Custom("Deadlock found".into())])
            .into_connection();

        let args = RoutineArgs::new()
            .with("p_flight_id", "F1")
            .with("p_status_id", 1)
            .with("p_departure_delay", 20);
        let err = call_transaction(&db, "UpdateFlightStatusWithPrediction", &args)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
    }
}
