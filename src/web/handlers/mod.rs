pub mod devices;
pub mod drivers;
pub mod health;
pub mod positions;
pub mod query;
