use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Written only by database routines and triggers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Delay_Prediction")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "predictionId")]
    pub prediction_id: String,
    #[sea_orm(column_name = "flightId")]
    pub flight_id: String,
    #[sea_orm(column_name = "predictionTime")]
    pub prediction_time: DateTime,
    #[sea_orm(column_name = "predictedDepartureDelay")]
    pub predicted_departure_delay: Option<f64>,
    #[sea_orm(column_name = "predictedArrivalDelay")]
    pub predicted_arrival_delay: Option<f64>,
    #[sea_orm(column_name = "notificationSent")]
    pub notification_sent: bool,
    #[sea_orm(column_name = "predictionReason")]
    pub prediction_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flight::Entity",
        from = "Column::FlightId",
        to = "super::flight::Column::FlightId"
    )]
    Flight,
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
