//! HTTP API handlers for wspm-pe

pub mod catalog;
pub mod health;
pub mod listing;
pub mod plans;
pub mod uploads;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use listing::listing_routes;
pub use plans::plan_routes;
pub use uploads::upload_routes;
