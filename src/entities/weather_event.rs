use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Weather_Event")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "eventId")]
    pub event_id: String,
    #[sea_orm(column_name = "airportCode")]
    pub airport_code: String,
    #[sea_orm(column_name = "type")]
    pub r#type: String,
    #[sea_orm(column_name = "severity")]
    pub severity: Option<String>,
    #[sea_orm(column_name = "startTime")]
    pub start_time: DateTime,
    #[sea_orm(column_name = "endTime")]
    pub end_time: DateTime,
    #[sea_orm(column_name = "precipitation")]
    pub precipitation: Option<f64>,
    #[sea_orm(column_name = "locationLat")]
    pub location_lat: Option<f64>,
    #[sea_orm(column_name = "locationLng")]
    pub location_lng: Option<f64>,
    #[sea_orm(column_name = "city")]
    pub city: Option<String>,
    #[sea_orm(column_name = "country")]
    pub country: Option<String>,
    #[sea_orm(column_name = "zipCode")]
    pub zip_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::airport::Entity",
        from = "Column::AirportCode",
        to = "super::airport::Column::AirportCode"
    )]
    Airport,
}

impl Related<super::airport::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Airport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
