//! Member directory for the admin view

use serde::Serialize;

use crate::{
    models::{
        loan::LoanDetails,
        user::{normalize_email, Role, User},
    },
    repository::Repository,
    services::loans::join_details,
};

/// A member card: the account and its loan counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSummary {
    pub email: String,
    pub name: String,
    pub active_loans: usize,
    pub total_loans: usize,
}

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Accounts with the User role, in signup order.
    ///
    /// A non-empty query matches the member's name or email, or the name,
    /// author or id of any book they ever borrowed.
    pub fn list_members(&self, query: &str) -> Vec<MemberSummary> {
        let query = query.trim().to_lowercase();
        let loans = join_details(
            self.repository.loans.get_all(),
            &self.repository.books.get_all(),
            &[],
        );

        self.repository
            .users
            .get_all()
            .into_iter()
            .filter(|u| u.role == Role::User)
            .filter_map(|user| {
                let email = normalize_email(&user.email);
                let theirs: Vec<&LoanDetails> =
                    loans.iter().filter(|l| l.record.user_email == email).collect();
                if !query.is_empty() && !member_matches(&user, &theirs, &query) {
                    return None;
                }
                Some(MemberSummary {
                    name: user.full_name(),
                    active_loans: theirs.iter().filter(|l| l.record.is_active()).count(),
                    total_loans: theirs.len(),
                    email,
                })
            })
            .collect()
    }

    /// Every loan of one member, newest first
    pub fn member_history(&self, user_email: &str) -> Vec<LoanDetails> {
        let records = self.repository.loans.for_user(&normalize_email(user_email));
        join_details(
            records,
            &self.repository.books.get_all(),
            &self.repository.users.get_all(),
        )
    }
}

fn member_matches(user: &User, loans: &[&LoanDetails], query: &str) -> bool {
    user.full_name().to_lowercase().contains(query)
        || user.email.to_lowercase().contains(query)
        || loans.iter().any(|l| l.book_matches(query))
}
