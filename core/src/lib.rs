pub mod config;
pub mod core;
pub mod model;
pub use deadpool_diesel;
