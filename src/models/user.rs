//! User model and related types

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Role chosen at signup, fixed for the account's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "member" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Read with the same leniency as `FromStr`, so `user` or `admin` written by
/// hand into the users table still loads
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Row of the users table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored and compared as plain text
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Signup form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: Role,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            email: normalize_email(&new.email),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            password: new.password,
            role: new.role,
        }
    }
}

/// What a successful login hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSession {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<&User> for UserSession {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

/// Emails are keys and compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_deserializes_any_case() {
        let roles: Vec<Role> = serde_json::from_str(r#"["admin", "User", "member"]"#).unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User, Role::User]);
        assert!(serde_json::from_str::<Role>(r#""librarian""#).is_err());
    }

    #[test]
    fn test_new_user_validation() {
        let form = NewUser {
            email: "not-an-email".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password: "secret".into(),
            role: Role::User,
        };
        assert!(form.validate().is_err());

        let form = NewUser { email: "Ada@Example.com".into(), ..form };
        assert!(form.validate().is_ok());
        let user = User::from(form);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.full_name(), "Ada Lovelace");
    }
}
