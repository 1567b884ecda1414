pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod metrics;
pub mod probe;
pub mod retention;
