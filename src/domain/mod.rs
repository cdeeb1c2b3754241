pub mod intervals;
pub mod mapping;
pub mod models;
