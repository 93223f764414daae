//! HTTP surface of the CO2 calculator: the HTML form at `/`, a JSON API,
//! health and metrics endpoints, plus configuration and logging setup for the
//! `co2calc` binary.

pub mod config;
pub mod logging;
pub mod page;
pub mod server;

pub use config::{LogFormat, WebConfig};
pub use logging::init_logging;
pub use server::{build_router, start_server, AppState};
