pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod market;
pub mod math;
pub mod telemetry;
pub mod types;
