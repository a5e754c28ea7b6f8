//! Pharmacy admin CLI - scripted access to the pharmacy API.
//!
//! # Usage
//!
//! ```bash
//! # Log in and print the token
//! pa-cli login -u admin -p secret
//!
//! # List on-sale products in two categories, cheapest first
//! PHARMACY_ADMIN_TOKEN=... pa-cli list products --is-sales true --categories 1,2 --sort-by price_asc
//!
//! # Flip a store's active flag
//! pa-cli --token ... status stores 4
//! ```
//!
//! # Commands
//!
//! - `login` - Authenticate and print the token with its expiry
//! - `list` / `get` - Read records as JSON
//! - `status` - Toggle a record's status flag
//! - `reset-password` - Reset an admin, customer or store password
//! - `delete` - Delete a record

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::{ListArgs, PasswordAccount, ResourceKind};

#[derive(Parser)]
#[command(name = "pa-cli")]
#[command(author, version, about = "Pharmacy admin CLI tools")]
struct Cli {
    /// Pharmacy API root
    #[arg(long, env = "API_BASE_URL", default_value = pharmacy_admin::config::DEFAULT_API_BASE_URL, global = true)]
    api_url: String,

    /// API token from `pa-cli login`
    #[arg(long, env = "PHARMACY_ADMIN_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as an administrator
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// List one page of records
    List {
        resource: ResourceKind,

        #[command(flatten)]
        args: ListArgs,
    },
    /// Show one record
    Get { resource: ResourceKind, id: i32 },
    /// Toggle a record's status flag
    Status { resource: ResourceKind, id: i32 },
    /// Reset an account password to the backend default
    ResetPassword { account: PasswordAccount, id: i32 },
    /// Delete a record
    Delete { resource: ResourceKind, id: i32 },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmacy_admin_cli=info,pharmacy_admin=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let client = commands::client(&cli.api_url)?;
    let token = cli.token.as_deref();

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&client, &username, password).await?;
        }
        Commands::List { resource, args } => {
            commands::records::list(&client, commands::require_token(token)?, resource, &args).await?;
        }
        Commands::Get { resource, id } => {
            commands::records::get(&client, commands::require_token(token)?, resource, id).await?;
        }
        Commands::Status { resource, id } => {
            commands::records::toggle_status(&client, commands::require_token(token)?, resource, id)
                .await?;
        }
        Commands::ResetPassword { account, id } => {
            commands::records::reset_password(&client, commands::require_token(token)?, account, id)
                .await?;
        }
        Commands::Delete { resource, id } => {
            commands::records::delete(&client, commands::require_token(token)?, resource, id).await?;
        }
    }
    Ok(())
}
