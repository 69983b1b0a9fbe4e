mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use migrations::CURRENT_SCHEMA_VERSION;
pub use models::Dataset;
