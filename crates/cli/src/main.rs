//! Lunch Order CLI - migrations, seeding, user management and the daily digest.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lunch-cli migrate
//!
//! # Load lunch types, option lists and a test admin
//! lunch-cli seed --reset
//!
//! # Create a user
//! lunch-cli user create -u alice -e alice@example.com -p 'correct horse' --admin
//!
//! # Grant or revoke admin rights
//! lunch-cli user set-admin -e alice@example.com --admin false
//!
//! # Email today's orders (from cron)
//! lunch-cli digest
//! lunch-cli digest --date 2025-06-04 --dry-run
//! ```
//!
//! All commands read `LUNCH_DATABASE_URL` (or `DATABASE_URL`); `digest` also
//! needs the `SMTP_*` variables unless `--dry-run` is given.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use lunch_order_web::config::WebConfig;
use lunch_order_web::db;

mod commands;

#[derive(Parser)]
#[command(name = "lunch-cli")]
#[command(author, version, about = "Lunch Order CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed lunch types, option lists, settings and a test admin
    Seed {
        /// Delete parameters, lunch types and users first
        #[arg(long)]
        reset: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Email the orders for a day to the configured recipients
    Digest {
        /// Day to report (default: today at the canteen)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print the email instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// Grant or revoke admin rights
    SetAdmin {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New admin flag
        #[arg(long, action = clap::ArgAction::Set)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = WebConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed { reset } => commands::seed::run(&pool, reset).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                admin,
            } => {
                commands::user::create(&pool, &username, &email, &password, admin).await?;
            }
            UserAction::SetAdmin { email, admin } => {
                commands::user::set_admin(&pool, &email, admin).await?;
            }
        },
        Commands::Digest { date, dry_run } => {
            commands::digest::run(&pool, &config, date, dry_run).await?;
        }
    }
    Ok(())
}
