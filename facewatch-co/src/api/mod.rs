//! API handlers

pub mod health;
pub mod media;
pub mod people;

pub use health::health_routes;
pub use media::media_routes;
pub use people::people_routes;
