//! Authentication service.
//!
//! Provides username and password authentication against the user store.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use taco_cloud_core::{NewUser, User};

use crate::db::{RepositoryError, UserRepository};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length (matches the `VARCHAR(50)` column).
const MAX_USERNAME_LENGTH: usize = 50;

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user with a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is empty or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register_with_password(
        &self,
        user: NewUser,
        password: &str,
    ) -> Result<User, AuthError> {
        validate_username(&user.username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidUsername(
            "username cannot be empty".to_owned(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidUsername(
            "username cannot contain whitespace".to_owned(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryUserRepository;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            full_name: "Sam Rivera".to_owned(),
            ..NewUser::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("carnitas-forever").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("carnitas-forever", &hash).is_ok());
        assert!(matches!(
            verify_password("carnitas-never", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let users = InMemoryUserRepository::new();
        let auth = AuthService::new(&users);

        let registered = auth
            .register_with_password(new_user("tacofan"), "carnitas-forever")
            .await
            .unwrap();

        let user = auth
            .login_with_password(" tacofan ", "carnitas-forever")
            .await
            .unwrap();
        assert_eq!(user, registered);

        let err = auth
            .login_with_password("tacofan", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = auth
            .login_with_password("nobody", "carnitas-forever")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let users = InMemoryUserRepository::new();
        let auth = AuthService::new(&users);

        let err = auth
            .register_with_password(new_user("tacofan"), "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));

        let err = auth
            .register_with_password(new_user("taco fan"), "long-enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidUsername(_)));

        auth.register_with_password(new_user("tacofan"), "long-enough")
            .await
            .unwrap();
        let err = auth
            .register_with_password(new_user("tacofan"), "long-enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }
}
