pub mod analysis;
pub mod flights;
pub mod procedures;
pub mod reference;
