//! Borrowing engine.
//!
//! A loan of (user, book) goes borrowed → collected → returned. Returned
//! records stay in the table as history; borrowing the same book again starts
//! a new record. Borrow, collect and return each rewrite the tables they
//! touch independently, with no atomicity across tables.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::LoanPolicy,
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{BorrowReceipt, BorrowRecord, BorrowTerms, LoanDetails, LoanFilter, LoanStats},
        user::{normalize_email, User},
    },
    repository::Repository,
    services::clock::Clock,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: LoanPolicy,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, policy: LoanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    pub fn terms(&self) -> BorrowTerms {
        BorrowTerms {
            max_active: self.policy.max_active,
            collection_days: self.policy.collection_days,
            return_days: self.policy.return_days,
            late_fee_per_day: self.policy.late_fee_per_day,
        }
    }

    /// Whether the user is under the borrow limit
    pub fn can_borrow(&self, user_email: &str) -> bool {
        self.repository.loans.count_active_for_user(&normalize_email(user_email)) < self.policy.max_active
    }

    pub fn has_active_borrow(&self, user_email: &str, book_id: i64) -> bool {
        self.repository.loans.has_active(&normalize_email(user_email), book_id)
    }

    /// Borrow one copy of a book.
    ///
    /// Checks run in order: borrow limit, duplicate loan, availability. On
    /// success the shelf count drops by one, the matching cart entry goes
    /// away and a new loan record is appended.
    pub fn borrow(&self, user_email: &str, book_id: i64) -> AppResult<BorrowReceipt> {
        let email = normalize_email(user_email);

        if !self.can_borrow(&email) {
            tracing::info!("Borrow of book {} by {} refused: limit reached", book_id, email);
            return Err(AppError::LimitReached {
                max: self.policy.max_active,
            });
        }
        if self.has_active_borrow(&email, book_id) {
            tracing::info!("Borrow of book {} by {} refused: already borrowed", book_id, email);
            return Err(AppError::AlreadyBorrowed { book_id });
        }
        let available = self
            .repository
            .books
            .get_by_id(book_id)
            .is_some_and(|b| b.is_available());
        if !available {
            tracing::info!("Borrow of book {} by {} refused: unavailable", book_id, email);
            return Err(AppError::Unavailable { book_id });
        }

        if !self.repository.books.decrease_count(book_id)? {
            tracing::error!("Book {} had copies a moment ago but the count could not be lowered", book_id);
            return Err(AppError::Internal(format!(
                "Failed to update availability of book {}",
                book_id
            )));
        }
        self.repository.cart.remove(&email, book_id)?;

        let record = BorrowRecord::issue(
            &email,
            book_id,
            self.clock.now(),
            self.policy.collection_days,
            self.policy.return_days,
        );
        self.repository.loans.create(&record)?;

        tracing::info!(
            "Book {} borrowed by {}; collect by {}, return by {}",
            book_id,
            email,
            record.collection_deadline,
            record.return_deadline
        );
        Ok(BorrowReceipt::from(&record))
    }

    /// Record that the member picked the book up. False when there is no
    /// active loan for the pair.
    pub fn mark_collected(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        let email = normalize_email(user_email);
        let now = self.clock.now();
        let updated = self
            .repository
            .loans
            .update_active(&email, book_id, |r| r.mark_collected(now))?;
        match updated {
            Some(_) => {
                tracing::info!("Book {} collected by {}", book_id, email);
                Ok(true)
            }
            None => {
                tracing::debug!("No active loan of book {} for {} to collect", book_id, email);
                Ok(false)
            }
        }
    }

    /// Close the active loan and put the copy back on the shelf. False when
    /// there is no active loan for the pair.
    pub fn mark_returned(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        let email = normalize_email(user_email);
        let now = self.clock.now();
        let updated = self
            .repository
            .loans
            .update_active(&email, book_id, |r| r.mark_returned(now))?;
        if updated.is_none() {
            tracing::debug!("No active loan of book {} for {} to return", book_id, email);
            return Ok(false);
        }

        // The loan is closed at this point; a shelf count that cannot move is
        // logged rather than reported as a failed return.
        match self.repository.books.increase_count(book_id) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Book {} returned by {} is no longer in the catalog", book_id, email)
            }
            Err(AppError::Internal(e)) => {
                tracing::error!("Return of book {} by {} left the count unchanged: {}", book_id, email, e)
            }
            Err(e) => return Err(e),
        }
        tracing::info!("Book {} returned by {}", book_id, email);
        Ok(true)
    }

    pub fn borrowed_stats(&self) -> LoanStats {
        LoanStats::tally(&self.repository.loans.get_all())
    }

    /// The user's loans, newest first
    pub fn user_borrow_history(&self, user_email: &str) -> Vec<LoanDetails> {
        let records = self.repository.loans.for_user(&normalize_email(user_email));
        self.details(records)
    }

    /// Every loan of every user, newest first
    pub fn all_borrow_records(&self) -> Vec<LoanDetails> {
        self.details(self.repository.loans.get_all())
    }

    pub fn filtered_records(&self, filter: LoanFilter) -> Vec<LoanDetails> {
        let records = self
            .repository
            .loans
            .get_all()
            .into_iter()
            .filter(|r| filter.accepts(r))
            .collect();
        self.details(records)
    }

    fn details(&self, records: Vec<BorrowRecord>) -> Vec<LoanDetails> {
        join_details(
            records,
            &self.repository.books.get_all(),
            &self.repository.users.get_all(),
        )
    }
}

/// Attach book and borrower details, newest issue date first
pub(crate) fn join_details(records: Vec<BorrowRecord>, books: &[Book], users: &[User]) -> Vec<LoanDetails> {
    let books: HashMap<i64, &Book> = books.iter().map(|b| (b.id, b)).collect();
    let names: HashMap<String, String> = users
        .iter()
        .map(|u| (normalize_email(&u.email), u.full_name()))
        .collect();

    let mut details: Vec<LoanDetails> = records
        .into_iter()
        .map(|record| {
            let book = books.get(&record.book_id);
            LoanDetails {
                book_name: book.map(|b| b.name.clone()),
                book_author: book.map(|b| b.author.clone()),
                image_path: book.and_then(|b| b.image_path.clone()),
                user_name: names
                    .get(&record.user_email)
                    .cloned()
                    .unwrap_or_else(|| record.user_email.clone()),
                record,
            }
        })
        .collect();
    details.sort_by(|a, b| b.record.issue_date.cmp(&a.record.issue_date));
    details
}
