//! Accounts: signup, login lookup and the admin passkey gate.
//!
//! Passwords are stored and compared as plain text.

use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, Role, User, UserSession},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.repository.users.exists(email)
    }

    pub fn get_user(&self, email: &str) -> Option<User> {
        self.repository.users.get_by_email(email)
    }

    pub fn get_all_users(&self) -> Vec<User> {
        self.repository.users.get_all()
    }

    /// Create an account without any role check
    pub fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;
        let user = User::from(new_user);
        self.repository.users.create(&user)?;
        tracing::info!("Created {} account {}", user.role, user.email);
        Ok(user)
    }

    /// Signup flow. Admin accounts need the configured passkey; without one
    /// configured nobody can sign up as admin.
    pub fn sign_up(&self, new_user: NewUser, passkey: Option<&str>) -> AppResult<User> {
        if new_user.role == Role::Admin {
            let expected = self.config.admin_passkey.as_deref().filter(|k| !k.is_empty());
            match (expected, passkey.map(str::trim)) {
                (Some(expected), Some(given)) if expected == given => {}
                (None, _) => {
                    tracing::warn!("Admin signup attempted but no admin passkey is configured");
                    return Err(AppError::Authorization("Admin signup is disabled".to_string()));
                }
                _ => {
                    tracing::warn!("Admin signup for {} rejected: wrong passkey", new_user.email);
                    return Err(AppError::Authorization("Invalid admin passkey".to_string()));
                }
            }
        }

        if self.user_exists(&new_user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        self.create_user(new_user)
    }

    /// Matching account for the credentials, if any
    pub fn validate_login(&self, email: &str, password: &str) -> Option<UserSession> {
        let user = self.repository.users.get_by_email(email)?;
        if user.password != password {
            tracing::debug!("Login failed for {}", user.email);
            return None;
        }
        tracing::info!("{} logged in as {}", user.email, user.role);
        Some(UserSession::from(&user))
    }
}
