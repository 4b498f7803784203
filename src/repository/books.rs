//! Books table

use std::path::Path;

use super::{CsvTable, Record};
use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

impl Record for Book {
    const TABLE: &'static str = "books";
    const FILE: &'static str = "books.csv";
    const COLUMNS: &'static [&'static str] = &["id", "name", "author", "image_path", "count", "stock"];
}

#[derive(Clone)]
pub struct BooksRepository {
    pub(crate) table: CsvTable<Book>,
}

impl BooksRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            table: CsvTable::new(dir),
        }
    }

    pub fn get_all(&self) -> Vec<Book> {
        self.table.load()
    }

    pub fn get_by_id(&self, id: i64) -> Option<Book> {
        self.table.load().into_iter().find(|b| b.id == id)
    }

    pub fn max_id(&self) -> Option<i64> {
        self.table.load().iter().map(|b| b.id).max()
    }

    /// Append a book; fails with `Conflict` when the id is taken
    pub fn create(&self, book: &Book) -> AppResult<()> {
        let mut books = self.table.load();
        if books.iter().any(|b| b.id == book.id) {
            return Err(AppError::Conflict(format!("Book ID {} already exists", book.id)));
        }
        books.push(book.clone());
        self.table.save(&books)
    }

    /// Apply `change` to the book in place. Returns the updated row, or None
    /// (and writes nothing) when the id is unknown.
    pub fn update(&self, id: i64, change: impl FnOnce(&mut Book)) -> AppResult<Option<Book>> {
        let mut books = self.table.load();
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        change(book);
        let updated = book.clone();
        self.table.save(&books)?;
        Ok(Some(updated))
    }

    /// Remove the row and hand it back
    pub fn delete(&self, id: i64) -> AppResult<Option<Book>> {
        let mut books = self.table.load();
        let Some(pos) = books.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        let removed = books.remove(pos);
        self.table.save(&books)?;
        Ok(Some(removed))
    }

    /// Take one copy off the shelf. False, with nothing written, when the
    /// book is unknown or has no copy left.
    pub fn decrease_count(&self, id: i64) -> AppResult<bool> {
        let mut books = self.table.load();
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        if book.count == 0 {
            return Ok(false);
        }
        book.count -= 1;
        self.table.save(&books)?;
        Ok(true)
    }

    /// Put one copy back. False when the book is unknown.
    ///
    /// Refuses with `Internal` when the shelf would hold more copies than the
    /// library owns, which only happens if a loan was matched wrongly.
    pub fn increase_count(&self, id: i64) -> AppResult<bool> {
        let mut books = self.table.load();
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        if let Some(stock) = book.stock {
            if book.count >= stock {
                tracing::error!(
                    "Refusing to raise count of book {} above its stock of {}",
                    id, stock
                );
                return Err(AppError::Internal(format!(
                    "Book {} already has all {} copies on the shelf",
                    id, stock
                )));
            }
        }
        book.count += 1;
        self.table.save(&books)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;

    fn repo() -> (tempfile::TempDir, BooksRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = BooksRepository::new(dir.path());
        (dir, repo)
    }

    #[test]
    fn test_decrease_stops_at_zero() {
        let (_dir, repo) = repo();
        repo.create(&Book::from(NewBook::new(1, "Dune", "Herbert"))).unwrap();

        assert!(repo.decrease_count(1).unwrap());
        assert!(!repo.decrease_count(1).unwrap());
        assert_eq!(repo.get_by_id(1).unwrap().count, 0);
        assert!(!repo.decrease_count(99).unwrap());
    }

    #[test]
    fn test_increase_respects_stock() {
        let (_dir, repo) = repo();
        repo.create(&Book::from(NewBook::new(1, "Dune", "Herbert").with_count(2))).unwrap();

        assert!(matches!(repo.increase_count(1), Err(AppError::Internal(_))));
        assert!(repo.decrease_count(1).unwrap());
        assert!(repo.increase_count(1).unwrap());
        assert_eq!(repo.get_by_id(1).unwrap().count, 2);
        assert!(!repo.increase_count(42).unwrap());
    }

    #[test]
    fn test_increase_without_stock_is_unbounded() {
        let (_dir, repo) = repo();
        let mut legacy = Book::from(NewBook::new(5, "Emma", "Austen"));
        legacy.stock = None;
        repo.create(&legacy).unwrap();

        assert!(repo.increase_count(5).unwrap());
        assert_eq!(repo.get_by_id(5).unwrap().count, 2);
    }

    #[test]
    fn test_max_id() {
        let (_dir, repo) = repo();
        assert_eq!(repo.max_id(), None);
        repo.create(&Book::from(NewBook::new(10, "Dune", "Herbert"))).unwrap();
        repo.create(&Book::from(NewBook::new(4, "Emma", "Austen"))).unwrap();
        assert_eq!(repo.max_id(), Some(10));
    }
}
