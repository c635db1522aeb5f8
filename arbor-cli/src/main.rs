// Arbor - A headless content backend built with Rust
// Copyright (C) 2025 Arbor Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use arbor_core::models::{role::Role, user::User};
use arbor_db::{repositories::UserRepository, ProductSeed, SeedData};
use arbor_web::config::DEFAULT_DATABASE_URL;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::io::Write;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor CLI tool for database and user management")]
struct Cli {
    /// Database URL (defaults to DATABASE_URL, then sqlite:arbor.db)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database (create tables)
    Init,

    /// Insert the predefined products. Not idempotent.
    Seed,

    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        email: String,
        /// Display name
        name: String,
        /// Role (viewer, editor, admin)
        #[arg(long, default_value = "viewer")]
        role: Role,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Change user password
    Password {
        /// Email address
        email: String,
        /// New password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Change user role
    Role {
        /// Email address
        email: String,
        /// New role (viewer, editor, admin)
        role: Role,
    },

    /// List all users
    List,
}

/// Flag first, then environment, then the default. Blank values count as unset.
fn resolve_database_url(flag: Option<String>, env: Option<String>) -> String {
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| env.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = resolve_database_url(cli.database_url, std::env::var("DATABASE_URL").ok());

    match cli.command {
        Commands::Init => {
            println!("Initializing database at: {}", database_url);
            arbor_db::init_database(&database_url).await?;
            println!("Database initialized successfully!");
            Ok(())
        }
        Commands::Seed => {
            let pool = arbor_db::init_database(&database_url).await?;
            let count = ProductSeed.insert_seed_data(&pool).await?;
            println!("Inserted {} products", count);
            Ok(())
        }
        Commands::User { command } => {
            let pool = arbor_db::init_database(&database_url).await?;
            handle_user_command(command, pool).await
        }
    }
}

fn read_password(prompt: &str, provided: Option<String>) -> Result<String> {
    match provided {
        Some(password) => Ok(password),
        None => {
            print!("{}", prompt);
            std::io::stdout().flush()?;
            rpassword::read_password().context("Failed to read password")
        }
    }
}

async fn handle_user_command(command: UserCommands, pool: SqlitePool) -> Result<()> {
    match command {
        UserCommands::Create {
            email,
            name,
            role,
            password,
        } => {
            println!("Creating user: {} ({})", name, email);
            let password = read_password("Password: ", password)?;

            let user_id = create_user(&pool, name, email, &password, role).await?;

            println!("User created successfully with ID: {}", user_id);
            println!("Role: {}", role);
            Ok(())
        }

        UserCommands::Password { email, password } => {
            println!("Changing password for {}", email);
            let password = read_password("New password: ", password)?;

            change_password(&pool, &email, &password).await?;

            println!("Password changed successfully!");
            Ok(())
        }

        UserCommands::Role { email, role } => {
            change_role(&pool, &email, role).await?;

            println!("{} is now {}", email, role);
            Ok(())
        }

        UserCommands::List => {
            let users = UserRepository::new(pool).list().await?;
            if users.is_empty() {
                println!("No users found.");
            }
            for user in users {
                println!(
                    "{:>4}  {:<8} {} <{}>",
                    user.id.unwrap_or_default(),
                    user.role,
                    user.name,
                    user.email
                );
            }
            Ok(())
        }
    }
}

async fn create_user(
    pool: &SqlitePool,
    name: String,
    email: String,
    password: &str,
    role: Role,
) -> Result<i64> {
    let user = User::with_role(name, email, password, role)?;

    let user_repo = UserRepository::new(pool.clone());
    if user_repo.find_by_email(&user.email).await?.is_some() {
        anyhow::bail!("A user with email {} already exists", user.email);
    }

    user_repo
        .create(&user)
        .await
        .context("Failed to create user")
}

async fn find_user(user_repo: &UserRepository, email: &str) -> Result<User> {
    user_repo
        .find_by_email(email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", email))
}

async fn change_password(pool: &SqlitePool, email: &str, password: &str) -> Result<()> {
    let user_repo = UserRepository::new(pool.clone());
    let mut user = find_user(&user_repo, email).await?;

    user.set_password(password)?;
    user_repo.update(&user).await
}

async fn change_role(pool: &SqlitePool, email: &str, role: Role) -> Result<()> {
    let user_repo = UserRepository::new(pool.clone());
    let mut user = find_user(&user_repo, email).await?;

    user.role = role;
    user_repo.update(&user).await
}
