//! Member carts: books set aside before borrowing

use crate::{
    error::AppResult,
    models::{book::Book, user::normalize_email},
    repository::Repository,
};

#[derive(Clone)]
pub struct CartService {
    repository: Repository,
}

impl CartService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// False when the book is already in the cart
    pub fn add(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        let added = self.repository.cart.add(&normalize_email(user_email), book_id)?;
        if added {
            tracing::debug!("Book {} added to cart of {}", book_id, user_email);
        }
        Ok(added)
    }

    /// Always true; removing an absent entry is a no-op
    pub fn remove(&self, user_email: &str, book_id: i64) -> AppResult<bool> {
        self.repository.cart.remove(&normalize_email(user_email), book_id)?;
        Ok(true)
    }

    pub fn is_in_cart(&self, user_email: &str, book_id: i64) -> bool {
        self.repository.cart.contains(&normalize_email(user_email), book_id)
    }

    /// Books in the user's cart, in catalog order. Entries pointing at books
    /// that no longer exist are left in the table but not listed.
    pub fn list(&self, user_email: &str) -> Vec<Book> {
        let entries = self.repository.cart.for_user(&normalize_email(user_email));
        if entries.is_empty() {
            return Vec::new();
        }
        self.repository
            .books
            .get_all()
            .into_iter()
            .filter(|b| entries.iter().any(|e| e.book_id == b.id))
            .collect()
    }

    /// Raw number of cart rows for the user, dangling ones included
    pub fn count(&self, user_email: &str) -> usize {
        self.repository.cart.for_user(&normalize_email(user_email)).len()
    }

    /// Empty the user's cart
    pub fn clear(&self, user_email: &str) -> AppResult<()> {
        self.repository.cart.clear(&normalize_email(user_email))?;
        Ok(())
    }
}
