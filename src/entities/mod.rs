pub mod airline;
pub mod airport;
pub mod delay_prediction;
pub mod flight;
pub mod flight_status;
pub mod weather_event;
