use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Flight")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "flightId")]
    pub flight_id: String,
    #[sea_orm(column_name = "airlineCode")]
    pub airline_code: String,
    #[sea_orm(column_name = "flightNumber")]
    pub flight_number: i32,
    #[sea_orm(column_name = "originAirport")]
    pub origin_airport: String,
    #[sea_orm(column_name = "destAirport")]
    pub dest_airport: String,
    #[sea_orm(column_name = "scheduledDepartureTime")]
    pub scheduled_departure_time: DateTime,
    #[sea_orm(column_name = "scheduledArrivalTime")]
    pub scheduled_arrival_time: DateTime,
    #[sea_orm(column_name = "elapsedTime")]
    pub elapsed_time: Option<i32>,
    #[sea_orm(column_name = "distance")]
    pub distance: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::airline::Entity",
        from = "Column::AirlineCode",
        to = "super::airline::Column::AirlineCode"
    )]
    Airline,
    #[sea_orm(
        belongs_to = "super::airport::Entity",
        from = "Column::OriginAirport",
        to = "super::airport::Column::AirportCode"
    )]
    OriginAirport,
    #[sea_orm(
        belongs_to = "super::airport::Entity",
        from = "Column::DestAirport",
        to = "super::airport::Column::AirportCode"
    )]
    DestAirport,
    #[sea_orm(has_many = "super::flight_status::Entity")]
    Statuses,
    #[sea_orm(has_many = "super::delay_prediction::Entity")]
    Predictions,
}

impl Related<super::airline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Airline.def()
    }
}

impl Related<super::flight_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl Related<super::delay_prediction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Predictions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
