pub mod database;
pub mod listing;
pub mod validation;
