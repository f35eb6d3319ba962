//! Fixtures shared by unit tests

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::{
    models::{Author, Book, Loan, Member},
    repository::{MockAuthorStore, MockBookStore, MockLoanStore, MockMemberStore, Repository},
    services::today,
};

pub fn repository(
    authors: MockAuthorStore,
    books: MockBookStore,
    members: MockMemberStore,
    loans: MockLoanStore,
) -> Repository {
    Repository::from_stores(Arc::new(authors), Arc::new(books), Arc::new(members), Arc::new(loans))
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn author(id: i32) -> Author {
    Author {
        id,
        first_name: "Dan".to_string(),
        last_name: "Brown".to_string(),
    }
}

pub fn book(id: i32, available_copies: i32) -> Book {
    Book {
        id,
        title: format!("Inferno {}", id),
        author_id: 1,
        isbn: format!("97800000000{:02}", id),
        genre: "fiction".to_string(),
        available_copies,
    }
}

pub fn member(id: i32, email: Option<&str>) -> Member {
    Member {
        id,
        user_id: id,
        username: format!("member{}", id),
        email: email.map(String::from),
    }
}

pub fn loan(id: i32, due_date: NaiveDate, is_returned: bool) -> Loan {
    Loan {
        id,
        book_id: 1,
        member_id: 1,
        due_date,
        is_returned,
        return_date: None,
    }
}
