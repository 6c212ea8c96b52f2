//! Customer account management commands.
//!
//! # Usage
//!
//! ```bash
//! TACO_USER_PASSWORD=... tc-cli user create -u sam -n "Sam Rivera" \
//!     --street "1234 Culinary Blvd." --city Plano --state TX --zip 76227 \
//!     --phone 123-123-1234
//! ```
//!
//! # Environment Variables
//!
//! - `TACO_DATABASE_URL` - `PostgreSQL` connection string
//! - `TACO_USER_PASSWORD` - Password when `--password` is not given

use taco_cloud_core::NewUser;
use taco_cloud_web::db::users::PgUserRepository;
use taco_cloud_web::services::auth::AuthService;

use super::{CliError, connect};

/// Create a customer account.
///
/// # Errors
///
/// Returns an error if no password was supplied, the username or password
/// fails validation, the username is taken, or the database is unreachable.
pub async fn create(user: NewUser, password: Option<String>) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let password = match password {
        Some(password) => password,
        None => std::env::var("TACO_USER_PASSWORD")
            .map_err(|_| CliError::MissingEnvVar("TACO_USER_PASSWORD"))?,
    };

    let pool = connect().await?;
    let users = PgUserRepository::new(pool);

    tracing::info!("Creating user: {}", user.username);
    let user = AuthService::new(&users)
        .register_with_password(user, &password)
        .await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(())
}
