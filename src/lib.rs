pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod generator;
pub mod models;
pub mod reporting;
pub mod transport;
pub mod utils;
