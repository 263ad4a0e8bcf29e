//! 用户管理 CLI 命令

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{CreateUserRequest, UserService};
use crate::storage::{SeaOrmStorage, User, UserFilter, UserRole, UserStatus};

/// 从不同来源获取密码
fn get_password(password: Option<String>, stdin: bool) -> Result<String, CliError> {
    if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::CommandError(format!("Failed to read from stdin: {}", e)))?;
        Ok(line.trim().to_string())
    } else if let Some(pwd) = password {
        Ok(pwd)
    } else {
        prompt_password_with_confirm()
    }
}

/// 交互式输入密码（带确认）
fn prompt_password_with_confirm() -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::CommandError(
            "No password provided. Use --password or --stdin flag, or run interactively."
                .to_string(),
        ));
    }

    let read = |prompt: &str| -> Result<String, CliError> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        rpassword::read_password()
            .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
    };

    let password = read("Enter password: ")?;
    let confirm = read("Confirm password: ")?;

    if password != confirm {
        return Err(CliError::CommandError("Passwords do not match".to_string()));
    }
    Ok(password)
}

fn parse_role(value: &str) -> Result<UserRole, CliError> {
    value.parse().map_err(|_| {
        CliError::ParseError(format!("Invalid role '{}', expected admin or user", value))
    })
}

fn parse_status(value: &str) -> Result<UserStatus, CliError> {
    value.parse().map_err(|_| {
        CliError::ParseError(format!(
            "Invalid status '{}', expected active or inactive",
            value
        ))
    })
}

/// 按 id 或邮箱定位用户
async fn resolve_user(service: &UserService, key: &str) -> Result<User, CliError> {
    let key = key.trim();
    if let Ok(id) = key.parse::<i64>() {
        return Ok(service.get_user(id).await?);
    }

    service
        .find_by_email(&key.to_lowercase())
        .await?
        .ok_or_else(|| CliError::CommandError(format!("User '{}' not found", key)))
}

fn print_user(user: &User) {
    let role = match user.role {
        UserRole::Admin => user.role.to_string().magenta(),
        UserRole::User => user.role.to_string().normal(),
    };
    let status = match user.status {
        UserStatus::Active => user.status.to_string().green(),
        UserStatus::Inactive => user.status.to_string().red(),
    };
    println!(
        "  {:>4}  {}  <{}>  [{}] [{}]",
        user.id.to_string().dimmed(),
        user.name.bold(),
        user.email.cyan(),
        role,
        status
    );
}

pub async fn add_user(
    storage: Arc<SeaOrmStorage>,
    name: String,
    email: String,
    role: String,
    password: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let role = parse_role(&role)?;
    let password = get_password(password, stdin)?;

    let service = UserService::new(storage);
    let user = service
        .create_user(CreateUserRequest {
            name,
            email,
            password,
            role,
            status: UserStatus::Active,
        })
        .await?;

    println!("{} User created", "✓".green().bold());
    print_user(&user);
    Ok(())
}

pub async fn list_users(
    storage: Arc<SeaOrmStorage>,
    search: Option<String>,
    role: Option<String>,
    status: Option<String>,
) -> Result<(), CliError> {
    let filter = UserFilter {
        search,
        role: role.as_deref().map(parse_role).transpose()?,
        status: status.as_deref().map(parse_status).transpose()?,
    };

    let service = UserService::new(storage);
    let (users, total) = service.list_users(filter, 1, 100).await?;

    if users.is_empty() {
        println!("{}", "No users found".yellow());
        return Ok(());
    }

    println!("{} {}", "Users:".bold().green(), total);
    for user in &users {
        print_user(user);
    }
    if total > users.len() as u64 {
        println!(
            "  {}",
            format!("... {} more, narrow with --search", total - users.len() as u64).dimmed()
        );
    }
    Ok(())
}

pub async fn change_password(
    storage: Arc<SeaOrmStorage>,
    user: String,
    password: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let service = UserService::new(storage);
    let target = resolve_user(&service, &user).await?;
    let password = get_password(password, stdin)?;

    service.change_password(target.id, &password).await?;
    println!(
        "{} Password updated for {}",
        "✓".green().bold(),
        target.email.cyan()
    );
    Ok(())
}

pub async fn remove_user(storage: Arc<SeaOrmStorage>, user: String) -> Result<(), CliError> {
    let service = UserService::new(storage);
    let target = resolve_user(&service, &user).await?;

    service.delete_user(target.id).await?;
    println!("{} User {} removed", "✓".green().bold(), target.email.cyan());
    Ok(())
}

pub async fn set_active(
    storage: Arc<SeaOrmStorage>,
    user: String,
    active: bool,
) -> Result<(), CliError> {
    let service = UserService::new(storage);
    let target = resolve_user(&service, &user).await?;

    let updated = if active {
        service.activate_user(target.id).await?
    } else {
        service.deactivate_user(target.id).await?
    };

    println!(
        "{} User {} is now {}",
        "✓".green().bold(),
        updated.email.cyan(),
        updated.status
    );
    Ok(())
}
