//! Data models for the library server

pub mod author;
pub mod book;
pub mod loan;
pub mod member;
pub mod pagination;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use loan::{Loan, LoanNotice, OverdueLoan};
pub use member::{Member, TopActiveMember};
pub use pagination::{Page, PageParams, PageRequest};
