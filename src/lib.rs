pub mod client;
pub mod config;
pub mod domain;
pub mod poll;
pub mod telemetry;
pub mod ui;
pub mod view;
