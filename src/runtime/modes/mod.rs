//! Mode routing
//!
//! No subcommand (or `serve`) starts the HTTP server, everything else
//! is a one-shot CLI command.

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;
