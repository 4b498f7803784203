//! Statistics service.
//!
//! Read-only aggregates for the admin dashboard, recomputed on every call.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    models::{loan::LoanStats, user::Role},
    repository::Repository,
};

/// Dashboard header cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryOverview {
    pub total_books: usize,
    /// Accounts with the User role
    pub total_members: usize,
    pub loans: LoanStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub users: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookStats {
    pub total: usize,
    pub with_images: usize,
}

/// A book and how many times it was ever borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookBorrowCount {
    pub book_id: i64,
    pub name: String,
    pub borrow_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: usize,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn overview(&self) -> LibraryOverview {
        LibraryOverview {
            total_books: self.repository.books.get_all().len(),
            total_members: self.user_stats().users,
            loans: LoanStats::tally(&self.repository.loans.get_all()),
        }
    }

    pub fn user_stats(&self) -> UserStats {
        let users = self.repository.users.get_all();
        let admins = users.iter().filter(|u| u.role == Role::Admin).count();
        UserStats {
            total: users.len(),
            admins,
            users: users.len() - admins,
        }
    }

    pub fn book_stats(&self) -> BookStats {
        let books = self.repository.books.get_all();
        BookStats {
            total: books.len(),
            with_images: books.iter().filter(|b| b.has_image()).count(),
        }
    }

    /// Catalog books ranked by all-time borrow count, most borrowed first.
    /// Ties keep catalog order; books never borrowed rank with a count of 0.
    pub fn most_borrowed(&self, limit: usize) -> Vec<BookBorrowCount> {
        let mut counts: IndexMap<i64, usize> = IndexMap::new();
        for record in self.repository.loans.get_all() {
            *counts.entry(record.book_id).or_default() += 1;
        }

        let mut ranked: Vec<BookBorrowCount> = self
            .repository
            .books
            .get_all()
            .into_iter()
            .map(|book| BookBorrowCount {
                borrow_count: counts.get(&book.id).copied().unwrap_or(0),
                book_id: book.id,
                name: book.name,
            })
            .collect();
        ranked.sort_by(|a, b| b.borrow_count.cmp(&a.borrow_count));
        ranked.truncate(limit);
        ranked
    }

    /// Pending / collected / returned split, zero slices left out
    pub fn status_distribution(&self) -> Vec<StatEntry> {
        let stats = LoanStats::tally(&self.repository.loans.get_all());
        [
            ("Pending Collection", stats.pending_collection),
            ("Collected", stats.collected),
            ("Returned", stats.returned),
        ]
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .map(|(label, value)| StatEntry {
            label: label.to_string(),
            value,
        })
        .collect()
    }
}
