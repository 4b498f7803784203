//! Users table

use std::path::Path;

use super::{CsvTable, Record};
use crate::{
    error::{AppError, AppResult},
    models::user::{normalize_email, User},
};

impl Record for User {
    const TABLE: &'static str = "users";
    const FILE: &'static str = "users.csv";
    const COLUMNS: &'static [&'static str] = &["email", "first_name", "last_name", "password", "role"];
}

#[derive(Clone)]
pub struct UsersRepository {
    pub(crate) table: CsvTable<User>,
}

impl UsersRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            table: CsvTable::new(dir),
        }
    }

    pub fn get_all(&self) -> Vec<User> {
        self.table.load()
    }

    /// Get user by email, case-insensitively
    pub fn get_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.table
            .load()
            .into_iter()
            .find(|u| normalize_email(&u.email) == email)
    }

    pub fn exists(&self, email: &str) -> bool {
        self.get_by_email(email).is_some()
    }

    /// Append a user; the email must not be taken
    pub fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.table.load();
        let email = normalize_email(&user.email);
        if users.iter().any(|u| normalize_email(&u.email) == email) {
            return Err(AppError::Conflict(format!("An account with email {} already exists", email)));
        }
        users.push(User {
            email,
            ..user.clone()
        });
        self.table.save(&users)
    }
}
