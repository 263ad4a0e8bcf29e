//! CLI interface module
//!
//! This module provides command-line interface functionality for linkhub.

pub mod commands;

use crate::cli::{Commands, ConfigCommands, UserCommands};
use crate::errors::LinkhubError;
use crate::storage::StorageFactory;
use commands::{config_generate, show_stats, user_management};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkhubError> for CliError {
    fn from(err: LinkhubError) -> Self {
        match &err {
            LinkhubError::Validation(msg) | LinkhubError::DateParse(msg) => {
                CliError::ParseError(msg.clone())
            }
            LinkhubError::DatabaseConfig(msg)
            | LinkhubError::DatabaseConnection(msg)
            | LinkhubError::DatabaseOperation(msg) => CliError::StorageError(msg.clone()),
            _ => CliError::CommandError(err.format_simple()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` is handled by the server mode and never reaches this function.
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generate doesn't need a DB connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;

    let result = match cmd {
        Commands::User { action } => match action {
            UserCommands::Add {
                name,
                email,
                role,
                password,
                stdin,
            } => user_management::add_user(storage.clone(), name, email, role, password, stdin).await,
            UserCommands::List {
                search,
                role,
                status,
            } => user_management::list_users(storage.clone(), search, role, status).await,
            UserCommands::Passwd {
                user,
                password,
                stdin,
            } => user_management::change_password(storage.clone(), user, password, stdin).await,
            UserCommands::Remove { user } => {
                user_management::remove_user(storage.clone(), user).await
            }
            UserCommands::Activate { user } => {
                user_management::set_active(storage.clone(), user, true).await
            }
            UserCommands::Deactivate { user } => {
                user_management::set_active(storage.clone(), user, false).await
            }
        },
        Commands::Stats => show_stats(storage.clone()).await,
        Commands::Serve | Commands::Config { .. } => {
            Err(CliError::CommandError("unexpected command".to_string()))
        }
    };

    storage.close().await;
    result
}
