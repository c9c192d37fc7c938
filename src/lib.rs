//! review-assistant library crate.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod feedback;
pub mod render;
pub mod storage;
pub mod telemetry;
pub mod ui;
