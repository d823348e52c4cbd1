use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

use crate::db::flights::{self, FlightDetail, FlightSummary};
use crate::entities::{airline, airport, weather_event};
use crate::error::{AppError, AppResult};
use crate::utils::designator::FlightDesignator;

const SEARCH_LIMIT: u64 = 20;
const WEATHER_EVENT_LIMIT: u64 = 100;

pub async fn airlines(db: &DatabaseConnection) -> AppResult<Vec<airline::Model>> {
    Ok(airline::Entity::find()
        .order_by_asc(airline::Column::Name)
        .all(db)
        .await?)
}

pub async fn airports(db: &DatabaseConnection) -> AppResult<Vec<airport::Model>> {
    Ok(airport::Entity::find()
        .order_by_asc(airport::Column::Name)
        .all(db)
        .await?)
}

/// Most recent events first.
pub async fn weather_events(db: &DatabaseConnection) -> AppResult<Vec<weather_event::Model>> {
    Ok(weather_event::Entity::find()
        .order_by_desc(weather_event::Column::StartTime)
        .limit(WEATHER_EVENT_LIMIT)
        .all(db)
        .await?)
}

pub async fn search_airlines(db: &DatabaseConnection, query: &str) -> AppResult<Vec<airline::Model>> {
    let airlines = airline::Entity::find()
        .filter(
            Condition::any()
                .add(airline::Column::AirlineCode.contains(query))
                .add(airline::Column::Name.contains(query))
                .add(Expr::cust_with_values(
                    "CAST(dotCode AS CHAR) LIKE ?",
                    [format!("%{query}%")],
                )),
        )
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;

    Ok(airlines)
}

pub async fn search_airports(db: &DatabaseConnection, query: &str) -> AppResult<Vec<airport::Model>> {
    let airports = airport::Entity::find()
        .filter(
            Condition::any()
                .add(airport::Column::AirportCode.contains(query))
                .add(airport::Column::Name.contains(query))
                .add(airport::Column::City.contains(query))
                .add(airport::Column::State.contains(query)),
        )
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;

    Ok(airports)
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SearchResults {
    /// The query was a flight designator such as `AA123`
    Designator {
        designator: String,
        detail: Option<FlightDetail>,
        flights: Vec<FlightSummary>,
    },
    General {
        flights: Vec<FlightSummary>,
        airlines: Vec<airline::Model>,
        airports: Vec<airport::Model>,
    },
}

/// A designator goes straight to the exact flight lookup; anything else is
/// matched as a substring across flights, airlines and airports.
pub async fn search(db: &DatabaseConnection, query: &str) -> AppResult<SearchResults> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Search query is required".to_string()));
    }

    if let Some(designator) = FlightDesignator::parse(query) {
        let detail = flights::detail_by_designator(db, &designator).await?;
        let flights = flights::find_by_designator(db, &designator).await?;
        return Ok(SearchResults::Designator {
            designator: format!("{}{}", designator.airline_code, designator.flight_number),
            detail,
            flights,
        });
    }

    Ok(SearchResults::General {
        flights: flights::search(db, query).await?,
        airlines: search_airlines(db, query).await?,
        airports: search_airports(db, query).await?,
    })
}
