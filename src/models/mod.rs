//! Data models for the library desk

pub mod book;
pub mod cart;
pub mod fields;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookUpdate, NewBook};
pub use cart::CartEntry;
pub use loan::{BorrowReceipt, BorrowRecord, BorrowTerms, LoanDetails, LoanFilter, LoanStats, LoanStatus};
pub use user::{NewUser, Role, User, UserSession};
