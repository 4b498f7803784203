//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookUpdate, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every book, in insertion order
    pub fn get_all_books(&self) -> Vec<Book> {
        self.repository.books.get_all()
    }

    pub fn get_book(&self, id: i64) -> Option<Book> {
        self.repository.books.get_by_id(id)
    }

    /// Case-insensitive substring search over name, author and id.
    /// An empty query lists the whole catalog.
    pub fn search_books(&self, query: &str) -> Vec<Book> {
        self.repository
            .books
            .get_all()
            .into_iter()
            .filter(|b| b.matches(query))
            .collect()
    }

    pub fn books_by_author(&self, author: &str) -> Vec<Book> {
        let author = author.trim().to_lowercase();
        self.repository
            .books
            .get_all()
            .into_iter()
            .filter(|b| b.author.trim().to_lowercase() == author)
            .collect()
    }

    /// Add a book under a caller-chosen id
    pub fn create_book(&self, new_book: NewBook) -> AppResult<Book> {
        new_book.validate()?;
        let book = Book::from(new_book);
        self.repository.books.create(&book)?;
        tracing::info!("Added book {} '{}' ({} copies)", book.id, book.name, book.count);
        Ok(book)
    }

    /// One past the highest id in the catalog or in any loan record, so a
    /// deleted book's id is never handed to a different book
    pub fn next_id(&self) -> i64 {
        let books = self.repository.books.max_id();
        let loans = self.repository.loans.max_book_id();
        books.max(loans).map_or(1, |max| max + 1)
    }

    /// Add a book under the next free id
    pub fn create_book_auto_id(
        &self,
        name: &str,
        author: &str,
        image_path: Option<String>,
        count: u32,
    ) -> AppResult<Book> {
        let new_book = NewBook {
            id: self.next_id(),
            name: name.to_string(),
            author: author.to_string(),
            image_path,
            count,
        };
        self.create_book(new_book)
    }

    /// Partial update. False when the book does not exist.
    ///
    /// A new `count` is the number of copies on the shelf; the copies owned
    /// become that plus whatever is currently out on loan.
    pub fn update_book(&self, id: i64, update: BookUpdate) -> AppResult<bool> {
        validate_text(update.name.as_deref(), "Book name")?;
        validate_text(update.author.as_deref(), "Author")?;
        if update.is_empty() {
            return Ok(self.get_book(id).is_some());
        }

        let on_loan = match update.count {
            Some(_) => self.repository.loans.count_active_for_book(id) as u32,
            None => 0,
        };
        let updated = self.repository.books.update(id, |book| apply(book, update, on_loan))?;
        match updated {
            Some(book) => {
                tracing::info!("Updated book {} '{}'", book.id, book.name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a book to a new id, applying `update` on the way. Loans and cart
    /// entries keep pointing at the old id.
    pub fn change_book_id(&self, old_id: i64, new_id: i64, update: BookUpdate) -> AppResult<Book> {
        if new_id == old_id {
            self.update_book(old_id, update)?;
            return self
                .get_book(old_id)
                .ok_or_else(|| AppError::NotFound(format!("Book {} not found", old_id)));
        }
        if new_id <= 0 {
            return Err(AppError::Validation("Book ID must be a positive number".to_string()));
        }
        if self.repository.books.get_by_id(new_id).is_some() {
            return Err(AppError::Conflict(format!("Book ID {} already exists", new_id)));
        }
        let old = self
            .repository
            .books
            .get_by_id(old_id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", old_id)))?;

        let on_loan = self.repository.loans.count_active_for_book(old_id);
        if on_loan > 0 {
            tracing::warn!("Re-keying book {} to {} while {} copies are on loan", old_id, new_id, on_loan);
        }

        let mut book = Book { id: new_id, ..old };
        apply(&mut book, update, 0);
        let new_book = NewBook {
            id: book.id,
            name: book.name,
            author: book.author,
            image_path: book.image_path,
            count: book.count,
        };
        new_book.validate()?;

        self.repository.books.delete(old_id)?;
        let created = Book::from(new_book);
        self.repository.books.create(&created)?;
        tracing::info!("Moved book {} to id {}", old_id, new_id);
        Ok(created)
    }

    /// Remove a book. Returns its image path so the caller can delete the file.
    pub fn delete_book(&self, id: i64) -> AppResult<Option<String>> {
        let on_loan = self.repository.loans.count_active_for_book(id);
        let Some(book) = self.repository.books.delete(id)? else {
            return Ok(None);
        };
        if on_loan > 0 {
            tracing::warn!("Deleted book {} with {} copies still on loan", id, on_loan);
        }
        tracing::info!("Deleted book {} '{}'", book.id, book.name);
        Ok(book.image_path)
    }

    pub fn decrease_count(&self, id: i64) -> AppResult<bool> {
        self.repository.books.decrease_count(id)
    }

    pub fn increase_count(&self, id: i64) -> AppResult<bool> {
        self.repository.books.increase_count(id)
    }

    /// Whether any member currently has this book on loan
    pub fn is_book_borrowed(&self, id: i64) -> bool {
        self.repository.loans.count_active_for_book(id) > 0
    }
}

fn apply(book: &mut Book, update: BookUpdate, on_loan: u32) {
    if let Some(name) = update.name {
        book.name = name.trim().to_string();
    }
    if let Some(author) = update.author {
        book.author = author.trim().to_string();
    }
    if let Some(path) = update.image_path {
        book.image_path = Some(path).filter(|p| !p.trim().is_empty());
    }
    if let Some(count) = update.count {
        book.count = count;
        book.stock = Some(count + on_loan);
    }
}

fn validate_text(value: Option<&str>, field: &str) -> AppResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::Validation(format!("{} cannot be empty", field))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (tempfile::TempDir, CatalogService) {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::open(dir.path()).unwrap();
        let service = CatalogService::new(repository);
        service.create_book(NewBook::new(1, "The Hobbit", "J.R.R. Tolkien")).unwrap();
        service.create_book(NewBook::new(2, "Dune", "Frank Herbert").with_count(2)).unwrap();
        service
            .create_book(NewBook::new(12, "The Silmarillion", "J.R.R. Tolkien").with_image("img/silm.png"))
            .unwrap();
        (dir, service)
    }

    #[test]
    fn test_search() {
        let (_dir, catalog) = catalog();
        let ids = |q: &str| catalog.search_books(q).iter().map(|b| b.id).collect::<Vec<_>>();

        assert_eq!(ids("tolkien"), vec![1, 12]);
        assert_eq!(ids("DUNE"), vec![2]);
        assert_eq!(ids("1"), vec![1, 12]);
        assert_eq!(ids(""), vec![1, 2, 12]);
        assert!(ids("asimov").is_empty());
    }

    #[test]
    fn test_duplicate_id_is_conflict() {
        let (_dir, catalog) = catalog();
        let err = catalog.create_book(NewBook::new(2, "Emma", "Jane Austen")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(catalog.get_book(2).unwrap().name, "Dune");
    }

    #[test]
    fn test_partial_update() {
        let (_dir, catalog) = catalog();
        let update = BookUpdate {
            author: Some("Frank Herbert Jr.".into()),
            ..Default::default()
        };
        assert!(catalog.update_book(2, update).unwrap());

        let dune = catalog.get_book(2).unwrap();
        assert_eq!(dune.name, "Dune");
        assert_eq!(dune.author, "Frank Herbert Jr.");
        assert_eq!(dune.count, 2);
        assert!(!catalog.update_book(99, BookUpdate::default()).unwrap());
        assert!(catalog.update_book(2, BookUpdate::default()).unwrap());
    }

    #[test]
    fn test_delete_returns_image_path() {
        let (_dir, catalog) = catalog();
        assert_eq!(catalog.delete_book(12).unwrap(), Some("img/silm.png".to_string()));
        assert_eq!(catalog.delete_book(1).unwrap(), None);
        assert_eq!(catalog.delete_book(1).unwrap(), None);
        assert_eq!(catalog.get_all_books().len(), 1);
    }

    #[test]
    fn test_auto_id_and_by_author() {
        let (_dir, catalog) = catalog();
        let book = catalog.create_book_auto_id("Unfinished Tales", "j.r.r. tolkien", None, 1).unwrap();
        assert_eq!(book.id, 13);
        assert_eq!(catalog.books_by_author("J.R.R. TOLKIEN").len(), 3);
    }

    #[test]
    fn test_change_book_id() {
        let (_dir, catalog) = catalog();
        let update = BookUpdate { count: Some(4), ..Default::default() };
        let moved = catalog.change_book_id(2, 20, update).unwrap();

        assert_eq!(moved.id, 20);
        assert_eq!(moved.count, 4);
        assert!(catalog.get_book(2).is_none());
        assert!(matches!(
            catalog.change_book_id(1, 12, BookUpdate::default()),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            catalog.change_book_id(99, 100, BookUpdate::default()),
            Err(AppError::NotFound(_))
        ));
    }
}
