pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
pub mod service;
pub mod telemetry;
