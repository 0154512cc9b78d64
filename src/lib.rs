// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns argument parsing and the terminal.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod error;
pub mod logging;
pub mod provider;
pub mod quiz;
pub mod runtime;
pub mod scorer;
pub mod session;
pub mod ui;

pub use countdown::TICK_RATE_MS;
