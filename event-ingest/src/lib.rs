pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod telemetry;
pub mod writer;
