//! Taco Cloud CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the schema and session table
//! tc-cli migrate
//!
//! # Load the ingredient list
//! tc-cli seed ingredients --file crates/cli/seed/ingredients.yaml
//!
//! # Create a customer account
//! tc-cli user create -u sam -n "Sam Rivera" --street "1234 Culinary Blvd." \
//!     --city Plano --state TX --zip 76227 --phone 123-123-1234
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use taco_cloud_core::NewUser;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(author, version, about = "Taco Cloud CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage customer accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert ingredients from a YAML file
    Ingredients {
        /// Path to the ingredients file
        #[arg(short, long, default_value = "crates/cli/seed/ingredients.yaml")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new customer
    Create(CreateUserArgs),
}

#[derive(Args)]
struct CreateUserArgs {
    /// Login name
    #[arg(short, long)]
    username: String,

    /// Full name, used as the default delivery name
    #[arg(short = 'n', long)]
    full_name: String,

    #[arg(long)]
    street: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zip: String,

    #[arg(long)]
    phone: String,

    /// Password (falls back to `TACO_USER_PASSWORD`)
    #[arg(long)]
    password: Option<String>,
}

impl CreateUserArgs {
    fn into_parts(self) -> (NewUser, Option<String>) {
        let user = NewUser {
            username: self.username,
            full_name: self.full_name,
            street: self.street,
            city: self.city,
            state: self.state,
            zip: self.zip,
            phone_number: self.phone,
        };
        (user, self.password)
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Ingredients { file } => commands::seed::ingredients(&file).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create(args) => {
                let (user, password) = args.into_parts();
                commands::user::create(user, password).await?;
            }
        },
    }
    Ok(())
}
