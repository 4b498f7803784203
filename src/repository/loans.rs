//! Borrow records table

use std::path::Path;

use super::{CsvTable, Record};
use crate::{error::AppResult, models::loan::BorrowRecord};

impl Record for BorrowRecord {
    const TABLE: &'static str = "loans";
    const FILE: &'static str = "borrowed_books.csv";
    const COLUMNS: &'static [&'static str] = &[
        "user_email",
        "book_id",
        "issue_date",
        "collection_deadline",
        "return_deadline",
        "status",
        "collected",
        "collection_date",
        "return_date",
    ];
}

#[derive(Clone)]
pub struct LoansRepository {
    pub(crate) table: CsvTable<BorrowRecord>,
}

impl LoansRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            table: CsvTable::new(dir),
        }
    }

    pub fn get_all(&self) -> Vec<BorrowRecord> {
        self.table.load()
    }

    pub fn for_user(&self, user_email: &str) -> Vec<BorrowRecord> {
        self.table
            .load()
            .into_iter()
            .filter(|r| r.user_email == user_email)
            .collect()
    }

    /// Number of loans the user has not returned yet
    pub fn count_active_for_user(&self, user_email: &str) -> usize {
        self.table
            .load()
            .iter()
            .filter(|r| r.is_active() && r.user_email == user_email)
            .count()
    }

    pub fn count_active_for_book(&self, book_id: i64) -> usize {
        self.table
            .load()
            .iter()
            .filter(|r| r.is_active() && r.book_id == book_id)
            .count()
    }

    pub fn has_active(&self, user_email: &str, book_id: i64) -> bool {
        self.table
            .load()
            .iter()
            .any(|r| r.is_active_for(user_email, book_id))
    }

    /// Highest book id any loan ever pointed at, returned loans included
    pub fn max_book_id(&self) -> Option<i64> {
        self.table.load().iter().map(|r| r.book_id).max()
    }

    pub fn create(&self, record: &BorrowRecord) -> AppResult<()> {
        let mut records = self.table.load();
        records.push(record.clone());
        self.table.save(&records)
    }

    /// Apply `change` to the active loan of (user, book). None, with nothing
    /// written, when there is no such loan.
    pub fn update_active(
        &self,
        user_email: &str,
        book_id: i64,
        change: impl FnOnce(&mut BorrowRecord),
    ) -> AppResult<Option<BorrowRecord>> {
        let mut records = self.table.load();
        let Some(record) = records.iter_mut().find(|r| r.is_active_for(user_email, book_id)) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.table.save(&records)?;
        Ok(Some(updated))
    }
}
