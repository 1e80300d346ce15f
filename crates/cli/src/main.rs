//! Pet Haven CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ph-cli migrate
//!
//! # Create an approved admin account
//! ph-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//!
//! # Approve a pending signup
//! ph-cli admin approve -e pending@example.com
//!
//! # Seed sample listings
//! ph-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an approved admin account
//! - `admin approve` - Approve a pending signup
//! - `seed` - Seed the database with sample listings

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ph-cli")]
#[command(author, version, about = "Pet Haven CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with sample listings
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account, already approved
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
    /// Approve a pending signup by email
    Approve {
        /// Email of the account to approve
        #[arg(short, long)]
        email: String,
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create(&email, &name, &password).await?;
            }
            AdminAction::Approve { email } => {
                commands::admin::approve(&email).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
