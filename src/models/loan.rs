//! Loan (borrow record) model and related types

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields;

/// Lifecycle status stored in the loans table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Borrowed,
    Returned,
}

/// Row of the loans table. Records are never deleted and form the loan history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub user_email: String,
    #[serde(with = "fields::int")]
    pub book_id: i64,
    #[serde(with = "fields::datetime")]
    pub issue_date: NaiveDateTime,
    #[serde(with = "fields::datetime")]
    pub collection_deadline: NaiveDateTime,
    #[serde(with = "fields::datetime")]
    pub return_deadline: NaiveDateTime,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default, with = "fields::flag")]
    pub collected: bool,
    #[serde(default, with = "fields::opt_datetime")]
    pub collection_date: Option<NaiveDateTime>,
    #[serde(default, with = "fields::opt_datetime")]
    pub return_date: Option<NaiveDateTime>,
}

impl BorrowRecord {
    /// Fresh loan issued at `issue_date`
    pub fn issue(
        user_email: &str,
        book_id: i64,
        issue_date: NaiveDateTime,
        collection_days: i64,
        return_days: i64,
    ) -> Self {
        Self {
            user_email: user_email.to_string(),
            book_id,
            issue_date,
            collection_deadline: issue_date + Duration::days(collection_days),
            return_deadline: issue_date + Duration::days(return_days),
            status: LoanStatus::Borrowed,
            collected: false,
            collection_date: None,
            return_date: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Borrowed
    }

    pub fn is_active_for(&self, user_email: &str, book_id: i64) -> bool {
        self.is_active() && self.book_id == book_id && self.user_email == user_email
    }

    pub fn is_pending_collection(&self) -> bool {
        self.is_active() && !self.collected
    }

    pub fn mark_collected(&mut self, at: NaiveDateTime) {
        self.collected = true;
        self.collection_date = Some(at);
    }

    pub fn mark_returned(&mut self, at: NaiveDateTime) {
        self.status = LoanStatus::Returned;
        self.return_date = Some(at);
    }

    /// Whole days until the return deadline; negative once overdue
    pub fn days_left(&self, now: NaiveDateTime) -> i64 {
        // floor, so half a day overdue already reads as -1
        (self.return_deadline - now).num_seconds().div_euclid(86_400)
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.is_active() && now > self.return_deadline
    }
}

/// Returned by a successful borrow so the desk can show both deadlines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowReceipt {
    pub book_id: i64,
    pub issue_date: NaiveDateTime,
    pub collection_deadline: NaiveDateTime,
    pub return_deadline: NaiveDateTime,
}

impl From<&BorrowRecord> for BorrowReceipt {
    fn from(record: &BorrowRecord) -> Self {
        Self {
            book_id: record.book_id,
            issue_date: record.issue_date,
            collection_deadline: record.collection_deadline,
            return_deadline: record.return_deadline,
        }
    }
}

/// Loan joined with the book and borrower for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub record: BorrowRecord,
    /// None when the book has since been removed from the catalog
    pub book_name: Option<String>,
    pub book_author: Option<String>,
    pub image_path: Option<String>,
    /// Borrower's full name, falling back to the email for unknown accounts
    pub user_name: String,
}

impl LoanDetails {
    pub fn days_left(&self, now: NaiveDateTime) -> i64 {
        self.record.days_left(now)
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.record.is_overdue(now)
    }

    /// Case-insensitive match on the book's name, author or id
    pub fn book_matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        let query = query.as_str();
        let contains = |field: &Option<String>| {
            field.as_deref().is_some_and(|v| v.to_lowercase().contains(query))
        };
        contains(&self.book_name)
            || contains(&self.book_author)
            || self.record.book_id.to_string().contains(query)
    }
}

/// Filter for the admin issue/return view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanFilter {
    #[default]
    All,
    Pending,
    Collected,
    Returned,
}

impl LoanFilter {
    pub fn accepts(&self, record: &BorrowRecord) -> bool {
        match self {
            LoanFilter::All => true,
            LoanFilter::Pending => record.is_pending_collection(),
            LoanFilter::Collected => record.is_active() && record.collected,
            LoanFilter::Returned => record.status == LoanStatus::Returned,
        }
    }
}

/// Counts over the whole loans table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoanStats {
    pub total: usize,
    pub active: usize,
    pub pending_collection: usize,
    pub collected: usize,
    pub returned: usize,
}

impl LoanStats {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a BorrowRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            if record.is_active() {
                stats.active += 1;
                if record.collected {
                    stats.collected += 1;
                } else {
                    stats.pending_collection += 1;
                }
            } else {
                stats.returned += 1;
            }
            stats
        })
    }
}

/// Borrowing terms shown before a member confirms a borrow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowTerms {
    pub max_active: usize,
    pub collection_days: i64,
    pub return_days: i64,
    pub late_fee_per_day: Decimal,
}
