//! Command-line front end for sigscan

pub mod app;
pub mod config;
pub mod exit_codes;

pub use app::CliApp;
pub use config::SigscanConfig;
pub use exit_codes::ExitCode;
