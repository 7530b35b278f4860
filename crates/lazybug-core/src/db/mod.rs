//! Database layer for LazyBug

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{FeedbackRepository, SqliteFeedbackRepository};
