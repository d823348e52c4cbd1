use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Airport")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "airportCode")]
    pub airport_code: String,
    #[sea_orm(column_name = "name")]
    pub name: String,
    #[sea_orm(column_name = "city")]
    pub city: String,
    #[sea_orm(column_name = "state")]
    pub state: Option<String>,
    #[sea_orm(column_name = "locationLat")]
    pub location_lat: Option<f64>,
    #[sea_orm(column_name = "locationLng")]
    pub location_lng: Option<f64>,
    #[sea_orm(column_name = "timeZone")]
    pub time_zone: Option<String>,
    #[sea_orm(column_name = "zipCode")]
    pub zip_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::weather_event::Entity")]
    WeatherEvents,
}

impl Related<super::weather_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeatherEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
