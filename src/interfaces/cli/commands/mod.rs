//! CLI command implementations

mod config_gen;
mod stats;
pub mod user_management;

pub use config_gen::config_generate;
pub use stats::show_stats;
