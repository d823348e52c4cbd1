use axum::{extract::State, Json};
use sea_orm::JsonValue;
use serde::{Deserialize, Serialize};

use crate::db::bridge::RoutineArgs;
use crate::db::procedures::{self, RoutineOutput};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRequest {
    pub procedure_name: Option<String>,
    #[serde(default)]
    pub params: RoutineArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub transaction_name: Option<String>,
    #[serde(default)]
    pub params: RoutineArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureResponse {
    pub results: Vec<JsonValue>,
    pub result_sets: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub result: Vec<JsonValue>,
    pub result_sets: Vec<Vec<JsonValue>>,
}

fn required_name(name: Option<String>, what: &str) -> AppResult<String> {
    name.filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{what} name is required")))
}

fn split(output: RoutineOutput) -> (Vec<JsonValue>, Vec<Vec<JsonValue>>) {
    let first = output.first().to_vec();
    (first, output.result_sets)
}

/// Call a stored procedure by name
pub async fn call_procedure(
    State(state): State<AppState>,
    Json(payload): Json<ProcedureRequest>,
) -> AppResult<Json<ProcedureResponse>> {
    let name = required_name(payload.procedure_name, "Procedure")?;
    let output = procedures::call_procedure(&state.db, &name, &payload.params).await?;

    let (results, result_sets) = split(output);
    Ok(Json(ProcedureResponse {
        results,
        result_sets,
    }))
}

/// Call a stored procedure inside its own transaction
pub async fn call_transaction(
    State(state): State<AppState>,
    Json(payload): Json<TransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let name = required_name(payload.transaction_name, "Transaction")?;
    let output = procedures::call_transaction(&state.db, &name, &payload.params).await?;

    let (result, result_sets) = split(output);
    Ok(Json(TransactionResponse { result, result_sets }))
}
