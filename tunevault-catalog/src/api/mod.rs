//! HTTP API handlers for tunevault-catalog

pub mod envelope;
pub mod health;
pub mod music;

pub use envelope::{respond, Operation};
pub use health::health_routes;
pub use music::{get_chart, get_detail, search_music};
