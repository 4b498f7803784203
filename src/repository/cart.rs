//! Cart table

use std::path::Path;

use super::{CsvTable, Record};
use crate::{error::AppResult, models::cart::CartEntry};

impl Record for CartEntry {
    const TABLE: &'static str = "cart";
    const FILE: &'static str = "cart.csv";
    const COLUMNS: &'static [&'static str] = &["user_email", "book_id"];
}

/// Emails are expected lower-cased by the caller
#[derive(Clone)]
pub struct CartRepository {
    pub(crate) table: CsvTable<CartEntry>,
}

impl CartRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            table: CsvTable::new(dir),
        }
    }

    pub fn for_user(&self, user_email: &str) -> Vec<CartEntry> {
        self.table
            .load()
            .into_iter()
            .filter(|e| e.user_email == user_email)
            .collect()
    }

    pub fn contains(&self, user_email: &str, book_id: i64) -> bool {
        self.table.load().iter().any(|e| e.is(user_email, book_id))
    }

    /// False, with nothing written, when the entry already exists
    pub fn add(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        let mut entries = self.table.load();
        if entries.iter().any(|e| e.is(user_email, book_id)) {
            return Ok(false);
        }
        entries.push(CartEntry {
            user_email: user_email.to_string(),
            book_id,
        });
        self.table.save(&entries)?;
        Ok(true)
    }

    /// Returns whether a row was actually removed
    pub fn remove(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        self.retain(|e| !e.is(user_email, book_id))
    }

    pub fn clear(&self, user_email: &str) -> AppResult<bool> {
        self.retain(|e| e.user_email != user_email)
    }

    fn retain(&self, keep: impl Fn(&CartEntry) -> bool) -> AppResult<bool> {
        let mut entries = self.table.load();
        let before = entries.len();
        entries.retain(|e| keep(e));
        if entries.len() == before {
            return Ok(false);
        }
        self.table.save(&entries)?;
        Ok(true)
    }
}
