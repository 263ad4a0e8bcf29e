//! Linkhub - a link-in-bio landing page with a small admin back office
//!
//! The public side serves a profile page with social links, a live-stream
//! indicator and the latest devotionals, and records link clicks. The admin
//! side manages users, a payment ledger, devotionals and click analytics.
//!
//! # Architecture
//! - `storage`: SeaORM backend over the analytics and users databases
//! - `services`: Business logic shared by the HTTP API and the CLI
//! - `api`: HTTP services, session tokens and the admin gate
//! - `interfaces`: Command-line interface
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
