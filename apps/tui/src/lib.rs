// Export our modules for use in binaries and tests
pub mod admin;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod db;
pub mod domain;
pub mod error;
pub mod event;
pub mod filter;
pub mod logging;
pub mod store;
pub mod terminal;
pub mod ui;
pub mod views;

pub use domain::{Incident, IncidentType, Theme, Verification};
