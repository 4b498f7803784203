//! Book model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::fields;

/// Copies assumed when a legacy row has no count column
pub const DEFAULT_COUNT: u32 = 1;

/// Row of the books table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(with = "fields::int")]
    pub id: i64,
    pub name: String,
    pub author: String,
    #[serde(default, with = "fields::opt_text")]
    pub image_path: Option<String>,
    /// Copies currently on the shelf
    #[serde(default = "default_count", with = "fields::count")]
    pub count: u32,
    /// Copies the library owns; unknown for rows written before it was tracked
    #[serde(default, with = "fields::opt_count")]
    pub stock: Option<u32>,
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.count > 0
    }

    pub fn has_image(&self) -> bool {
        self.image_path.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    /// Case-insensitive match on name, author or id
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.author.to_lowercase().contains(&query)
            || self.id.to_string().contains(&query)
    }
}

/// Add-book form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBook {
    #[validate(range(min = 1, message = "Book ID must be a positive number"))]
    pub id: i64,
    #[validate(length(min = 1, message = "Book name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub image_path: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl NewBook {
    pub fn new(id: i64, name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            author: author.into(),
            image_path: None,
            count: DEFAULT_COUNT,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}

impl From<NewBook> for Book {
    fn from(new: NewBook) -> Self {
        Self {
            id: new.id,
            name: new.name.trim().to_string(),
            author: new.author.trim().to_string(),
            image_path: new.image_path.filter(|p| !p.trim().is_empty()),
            count: new.count,
            stock: Some(new.count),
        }
    }
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub name: Option<String>,
    pub author: Option<String>,
    pub image_path: Option<String>,
    pub count: Option<u32>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.author.is_none() && self.image_path.is_none() && self.count.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hobbit() -> Book {
        Book::from(NewBook::new(7, "The Hobbit", "J.R.R. Tolkien"))
    }

    #[test]
    fn test_matches_name_author_and_id() {
        let book = hobbit();
        assert!(book.matches("hobbit"));
        assert!(book.matches("TOLKIEN"));
        assert!(book.matches("7"));
        assert!(book.matches(""));
        assert!(!book.matches("dune"));
    }

    #[test]
    fn test_new_book_tracks_stock() {
        let book = Book::from(NewBook::new(1, " Dune ", "Herbert").with_count(3).with_image(""));
        assert_eq!(book.name, "Dune");
        assert_eq!(book.count, 3);
        assert_eq!(book.stock, Some(3));
        assert!(!book.has_image());
    }

    #[test]
    fn test_new_book_validation() {
        assert!(NewBook::new(0, "Dune", "Herbert").validate().is_err());
        assert!(NewBook::new(1, "", "Herbert").validate().is_err());
        assert!(NewBook::new(1, "Dune", "Herbert").validate().is_ok());
    }
}
