//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkhub using clap's derive macros.

use clap::{Parser, Subcommand};

/// Linkhub - link-in-bio landing page with an admin back office
#[derive(Parser)]
#[command(name = "linkhub")]
#[command(version)]
#[command(about = "Link-in-bio landing page with an admin back office", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Print the click analytics summary
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// User management commands
///
/// `<USER>` accepts either a numeric id or an email address.
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address (login)
        #[arg(long)]
        email: String,

        /// Role: admin or user
        #[arg(long, default_value = "user")]
        role: String,

        /// Password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// List users
    List {
        /// Match name or email
        #[arg(long)]
        search: Option<String>,

        /// Filter by role (admin, user)
        #[arg(long)]
        role: Option<String>,

        /// Filter by status (active, inactive)
        #[arg(long)]
        status: Option<String>,
    },

    /// Change a user's password
    Passwd {
        /// User id or email
        user: String,

        /// New password (not recommended, visible in shell history)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// Delete a user
    Remove {
        /// User id or email
        user: String,
    },

    /// Activate a user
    Activate {
        /// User id or email
        user: String,
    },

    /// Deactivate a user
    Deactivate {
        /// User id or email
        user: String,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::try_parse_from(["linkhub"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_user_add() {
        let cli = Cli::try_parse_from([
            "linkhub",
            "user",
            "add",
            "--name",
            "Ana",
            "--email",
            "ana@example.com",
            "--role",
            "admin",
            "--stdin",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::User {
                action:
                    UserCommands::Add {
                        name,
                        email,
                        role,
                        password,
                        stdin,
                    },
            }) => {
                assert_eq!(name, "Ana");
                assert_eq!(email, "ana@example.com");
                assert_eq!(role, "admin");
                assert!(password.is_none());
                assert!(stdin);
            }
            _ => panic!("expected user add"),
        }
    }

    #[test]
    fn test_parse_config_generate() {
        let cli =
            Cli::try_parse_from(["linkhub", "-c", "alt.toml", "config", "generate", "out.toml", "--force"])
                .unwrap();
        assert_eq!(cli.config, "alt.toml");
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate { force: true, .. }
            })
        ));
    }

    #[test]
    fn test_user_passwd_requires_target() {
        assert!(Cli::try_parse_from(["linkhub", "user", "passwd"]).is_err());
    }
}
