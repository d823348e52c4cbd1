pub mod designator;
pub mod geo;
pub mod status;
