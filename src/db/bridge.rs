//! Turns a routine name plus an ordered argument list into a positional
//! `CALL routine(?, ...)` statement.
//!
//! Routines in [`CATALOGUE`] have their arguments arranged by declared
//! parameter name, so callers never depend on argument order for them.
//! Anything else is called with arguments in the order given.

use sea_orm::{DbBackend, IsolationLevel, Statement, Value};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    /// Called directly, one round trip
    Procedure,
    /// Called inside an explicit begin/commit block
    Transaction,
}

#[derive(Debug)]
pub struct RoutineSignature {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub kind: RoutineKind,
    pub isolation: Option<IsolationLevel>,
}

pub const CATALOGUE: &[RoutineSignature] = &[
    RoutineSignature {
        name: "GetWeatherImpactOnDelays",
        params: &["p_airport_code", "p_start_date", "p_end_date"],
        kind: RoutineKind::Procedure,
        isolation: None,
    },
    RoutineSignature {
        name: "GetAirlinePerformanceMetrics",
        params: &[],
        kind: RoutineKind::Procedure,
        isolation: None,
    },
    RoutineSignature {
        name: "GetRouteDelayAnalysis",
        params: &[],
        kind: RoutineKind::Procedure,
        isolation: None,
    },
    RoutineSignature {
        name: "GetDelayedFlights",
        params: &[
            "p_threshold",
            "p_start_date",
            "p_end_date",
            "p_airline_code",
            "p_max_results",
        ],
        kind: RoutineKind::Procedure,
        isolation: None,
    },
    RoutineSignature {
        name: "UpdateFlightStatusWithPrediction",
        params: &[
            "p_flight_id",
            "p_status_id",
            "p_departure_delay",
            "p_arrival_delay",
            "p_cancelled",
            "p_weather_delay",
            "p_carrier_delay",
        ],
        kind: RoutineKind::Transaction,
        isolation: Some(IsolationLevel::RepeatableRead),
    },
    RoutineSignature {
        name: "BulkCancellationDueToWeather",
        params: &["p_airport_code", "p_cancellation_code", "p_weather_event_id"],
        kind: RoutineKind::Transaction,
        isolation: Some(IsolationLevel::Serializable),
    },
];

/// Routine names are case-insensitive in MySQL.
pub fn signature(name: &str) -> Option<&'static RoutineSignature> {
    CATALOGUE
        .iter()
        .find(|signature| signature.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutineArg {
    pub name: String,
    pub value: JsonValue,
}

/// Ordered routine arguments.
///
/// Deserializes from either `[{"name": .., "value": ..}, ..]` or a JSON
/// object, whose document order is kept. `null` is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Option<RawArgs>")]
pub struct RoutineArgs(Vec<RoutineArg>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArgs {
    Ordered(Vec<RoutineArg>),
    Named(Map<String, JsonValue>),
}

impl From<Option<RawArgs>> for RoutineArgs {
    fn from(raw: Option<RawArgs>) -> Self {
        match raw {
            None => Self::default(),
            Some(RawArgs::Ordered(args)) => Self(args),
            Some(RawArgs::Named(map)) => map.into_iter().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, JsonValue)> for RoutineArgs {
    fn from_iter<I: IntoIterator<Item = (S, JsonValue)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| RoutineArg {
                    name: name.into(),
                    value,
                })
                .collect(),
        )
    }
}

impl RoutineArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.push(RoutineArg {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutineArg> {
        self.0.iter()
    }
}

/// A fully bound `CALL` ready to run.
#[derive(Debug, Clone)]
pub struct RoutineCall {
    pub routine: String,
    pub sql: String,
    pub values: Vec<Value>,
    pub signature: Option<&'static RoutineSignature>,
}

impl RoutineCall {
    pub fn build(name: &str, args: &RoutineArgs) -> AppResult<Self> {
        let routine = validate_name(name)?;
        let signature = signature(routine);

        let ordered: Vec<(&str, &JsonValue)> = match signature {
            Some(signature) => arrange(signature, args)?,
            None => args.iter().map(|arg| (arg.name.as_str(), &arg.value)).collect(),
        };

        let values = ordered
            .into_iter()
            .map(|(param, value)| to_sql_value(routine, param, value))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            routine: routine.to_string(),
            sql: format!("CALL {}({})", routine, placeholders(values.len())),
            values,
            signature,
        })
    }

    pub fn kind(&self) -> Option<RoutineKind> {
        self.signature.map(|signature| signature.kind)
    }

    pub fn isolation(&self) -> Option<IsolationLevel> {
        self.signature.and_then(|signature| signature.isolation)
    }

    pub fn statement(&self, backend: DbBackend) -> Statement {
        Statement::from_sql_and_values(backend, &self.sql, self.values.clone())
    }
}

/// `?, ?, ?` for `count` positional parameters.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn validate_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Routine name is required".to_string()));
    }

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(format!(
            "Invalid routine name: {name:?}"
        )));
    }

    Ok(name)
}

/// Line arguments up with the declared parameters. Missing parameters bind
/// as NULL.
fn arrange<'a>(
    signature: &RoutineSignature,
    args: &'a RoutineArgs,
) -> AppResult<Vec<(&'static str, &'a JsonValue)>> {
    for (index, arg) in args.iter().enumerate() {
        if !signature
            .params
            .iter()
            .any(|param| param.eq_ignore_ascii_case(&arg.name))
        {
            return Err(AppError::Validation(format!(
                "Unknown parameter {:?} for {}; expected one of: {}",
                arg.name,
                signature.name,
                signature.params.join(", ")
            )));
        }
        if args
            .iter()
            .take(index)
            .any(|earlier| earlier.name.eq_ignore_ascii_case(&arg.name))
        {
            return Err(AppError::Validation(format!(
                "Parameter {:?} given more than once",
                arg.name
            )));
        }
    }

    Ok(signature
        .params
        .iter()
        .map(|param| {
            let value = args
                .iter()
                .find(|arg| arg.name.eq_ignore_ascii_case(param))
                .map_or(&JsonValue::Null, |arg| &arg.value);
            (*param, value)
        })
        .collect())
}

fn to_sql_value(routine: &str, param: &str, value: &JsonValue) -> AppResult<Value> {
    let value = match value {
        JsonValue::Null => Value::String(None),
        JsonValue::Bool(b) => Value::Bool(Some(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(Some(i))
            } else if let Some(u) = n.as_u64() {
                Value::BigUnsigned(Some(u))
            } else {
                Value::Double(n.as_f64())
            }
        }
        JsonValue::String(s) => Value::from(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            return Err(AppError::Validation(format!(
                "Parameter {param:?} of {routine} must be a scalar value"
            )));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholders_match_argument_count() {
        for count in 0..6 {
            let args: RoutineArgs = (0..count).map(|i| (format!("p{i}"), json!(i))).collect();
            let call = RoutineCall::build("CustomReport", &args).unwrap();

            assert_eq!(call.values.len(), count);
            assert_eq!(call.sql.matches('?').count(), count);
        }
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_uncatalogued_routine_keeps_argument_order() {
        let args = RoutineArgs::new()
            .with("b", "second")
            .with("a", 1)
            .with("c", JsonValue::Null);
        let call = RoutineCall::build("CustomReport", &args).unwrap();

        assert_eq!(call.sql, "CALL CustomReport(?, ?, ?)");
        assert_eq!(
            call.values,
            vec![
                Value::from("second".to_string()),
                Value::BigInt(Some(1)),
                Value::String(None),
            ]
        );
        assert!(call.signature.is_none());
    }

    #[test]
    fn test_catalogued_routine_uses_declared_order() {
        let args = RoutineArgs::new()
            .with("p_max_results", 10)
            .with("p_airline_code", "AA")
            .with("p_threshold", 30);
        let call = RoutineCall::build("GetDelayedFlights", &args).unwrap();

        assert_eq!(call.sql, "CALL GetDelayedFlights(?, ?, ?, ?, ?)");
        assert_eq!(
            call.values,
            vec![
                Value::BigInt(Some(30)),
                Value::String(None),
                Value::String(None),
                Value::from("AA".to_string()),
                Value::BigInt(Some(10)),
            ]
        );
        assert_eq!(call.kind(), Some(RoutineKind::Procedure));
    }

    #[test]
    fn test_catalogue_lookup_is_case_insensitive() {
        let call = RoutineCall::build("getairlineperformancemetrics", &RoutineArgs::new()).unwrap();
        assert_eq!(call.sql, "CALL getairlineperformancemetrics()");
        assert_eq!(call.signature.map(|s| s.name), Some("GetAirlinePerformanceMetrics"));
    }

    #[test]
    fn test_transactions_carry_isolation() {
        let call = RoutineCall::build("BulkCancellationDueToWeather", &RoutineArgs::new()).unwrap();
        assert_eq!(call.kind(), Some(RoutineKind::Transaction));
        assert!(matches!(call.isolation(), Some(IsolationLevel::Serializable)));
        assert_eq!(call.values.len(), 3);
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let args = RoutineArgs::new().with("p_airport", "ORD");
        let err = RoutineCall::build("GetWeatherImpactOnDelays", &args).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("p_airport")));
    }

    #[test]
    fn test_duplicate_parameter_is_rejected() {
        let args = RoutineArgs::new()
            .with("p_airport_code", "ORD")
            .with("P_AIRPORT_CODE", "JFK");
        let err = RoutineCall::build("GetWeatherImpactOnDelays", &args).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        for name in ["", "   "] {
            let err = RoutineCall::build(name, &RoutineArgs::new()).unwrap_err();
            assert!(matches!(err, AppError::Validation(msg) if msg == "Routine name is required"));
        }
    }

    #[test]
    fn test_name_must_be_an_identifier() {
        for name in ["Get(); DROP TABLE Flight", "1abc", "a-b", "db.proc"] {
            let err = RoutineCall::build(name, &RoutineArgs::new()).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name}");
        }
    }

    #[test]
    fn test_composite_values_are_rejected() {
        let args = RoutineArgs::new().with("p", json!([1, 2]));
        assert!(RoutineCall::build("CustomReport", &args).is_err());
    }

    #[test]
    fn test_scalar_conversion() {
        let args = RoutineArgs::new()
            .with("flag", true)
            .with("ratio", 1.5)
            .with("big", json!(u64::MAX));
        let call = RoutineCall::build("CustomReport", &args).unwrap();
        assert_eq!(
            call.values,
            vec![
                Value::Bool(Some(true)),
                Value::Double(Some(1.5)),
                Value::BigUnsigned(Some(u64::MAX)),
            ]
        );
    }

    #[test]
    fn test_object_params_keep_document_order() {
        let args: RoutineArgs =
            serde_json::from_value(json!({ "z": 1, "a": 2, "m": 3 })).unwrap();
        let names: Vec<_> = args.iter().map(|arg| arg.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_list_params_and_null() {
        let args: RoutineArgs = serde_json::from_value(json!([
            { "name": "p_threshold", "value": 20 },
            { "name": "p_airline_code", "value": null }
        ]))
        .unwrap();
        assert_eq!(args.len(), 2);

        let args: RoutineArgs = serde_json::from_value(JsonValue::Null).unwrap();
        assert!(args.is_empty());
    }
}
