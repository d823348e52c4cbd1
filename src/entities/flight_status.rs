use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Flight_Status")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "statusId")]
    pub status_id: String,
    #[sea_orm(column_name = "flightId")]
    pub flight_id: String,
    #[sea_orm(column_name = "flightDate")]
    pub flight_date: Date,
    #[sea_orm(column_name = "actualDepartureTime")]
    pub actual_departure_time: Option<DateTime>,
    #[sea_orm(column_name = "actualArrivalTime")]
    pub actual_arrival_time: Option<DateTime>,
    #[sea_orm(column_name = "departureDelay")]
    pub departure_delay: Option<f64>,
    #[sea_orm(column_name = "arrivalDelay")]
    pub arrival_delay: Option<f64>,
    #[sea_orm(column_name = "taxiOut")]
    pub taxi_out: Option<f64>,
    #[sea_orm(column_name = "taxiIn")]
    pub taxi_in: Option<f64>,
    #[sea_orm(column_name = "actualElapsedTime")]
    pub actual_elapsed_time: Option<f64>,
    #[sea_orm(column_name = "airTime")]
    pub air_time: Option<f64>,
    #[sea_orm(column_name = "cancelled")]
    pub cancelled: bool,
    #[sea_orm(column_name = "cancellationCode")]
    pub cancellation_code: Option<String>,
    #[sea_orm(column_name = "diverted")]
    pub diverted: bool,
    #[sea_orm(column_name = "carrierDelay")]
    pub carrier_delay: Option<f64>,
    #[sea_orm(column_name = "weatherDelay")]
    pub weather_delay: Option<f64>,
    #[sea_orm(column_name = "nasDelay")]
    pub nas_delay: Option<f64>,
    #[sea_orm(column_name = "securityDelay")]
    pub security_delay: Option<f64>,
    #[sea_orm(column_name = "lateAircraftDelay")]
    pub late_aircraft_delay: Option<f64>,
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
