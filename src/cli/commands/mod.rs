pub mod auth;
pub mod dashboard;
pub mod open;
pub mod tx;
