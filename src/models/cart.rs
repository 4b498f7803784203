//! Cart entry model

use serde::{Deserialize, Serialize};

use super::fields;

/// A book a member set aside before borrowing; (user_email, book_id) is unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub user_email: String,
    #[serde(with = "fields::int")]
    pub book_id: i64,
}

impl CartEntry {
    pub fn is(&self, user_email: &str, book_id: i64) -> bool {
        self.book_id == book_id && self.user_email == user_email
    }
}
