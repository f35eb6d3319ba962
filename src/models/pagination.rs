//! Page-number pagination for list endpoints
//!
//! Lists are wrapped as `{count, next, previous, results}`. Clients pick a
//! page with `?page=N` (1-based) and may override the page size with
//! `?page_size=N`, capped at [`MAX_PAGE_SIZE`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Author, Book, Loan, Member};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

const INVALID_PAGE: &str = "Invalid page.";

/// Raw pagination query parameters.
///
/// Kept as strings so that malformed values can be handled the same way
/// as out-of-range ones instead of being rejected by the extractor.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Validated page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
    /// Whether the client asked for the page size, so links carry it forward
    pub explicit_page_size: bool,
}

impl PageParams {
    pub fn resolve(&self) -> AppResult<PageRequest> {
        let page = match self.page.as_deref() {
            None => 1,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(AppError::NotFound(INVALID_PAGE.to_string())),
            },
        };

        let requested = self
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n > 0);

        let page_size = requested.map_or(DEFAULT_PAGE_SIZE, |n| n.min(MAX_PAGE_SIZE));

        // A page whose offset does not fit in an i64 is past any real table
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::NotFound(INVALID_PAGE.to_string()));
        }

        Ok(PageRequest {
            page,
            page_size,
            explicit_page_size: requested.is_some(),
        })
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Number of pages for `count` rows; an empty list still has one page
    pub fn num_pages(&self, count: i64) -> i64 {
        ((count + self.page_size - 1) / self.page_size).max(1)
    }

    fn link(&self, path: &str, page: i64) -> String {
        let mut query = Vec::new();
        if page > 1 {
            query.push(format!("page={}", page));
        }
        if self.explicit_page_size {
            query.push(format!("page_size={}", self.page_size));
        }
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query.join("&"))
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<Author>,
    BookPage = Page<Book>,
    MemberPage = Page<Member>,
    LoanPage = Page<Loan>
)]
pub struct Page<T> {
    /// Total number of rows across all pages
    pub count: i64,
    /// Link to the next page
    pub next: Option<String>,
    /// Link to the previous page
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of `results` out of `count` rows; `path` is the list URL the links point at
    pub fn build(results: Vec<T>, count: i64, request: &PageRequest, path: &str) -> AppResult<Self> {
        let num_pages = request.num_pages(count);
        if request.page > num_pages {
            return Err(AppError::NotFound(INVALID_PAGE.to_string()));
        }

        let next = (request.page < num_pages).then(|| request.link(path, request.page + 1));
        let previous = (request.page > 1).then(|| request.link(path, request.page - 1));

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }
}
