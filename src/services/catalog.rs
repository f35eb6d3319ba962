//! Catalog management service (authors and books)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{CreateBook, UpdateBook},
        Author, Book, PageRequest,
    },
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

    pub async fn list_authors(&self, page: &PageRequest) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(page.limit(), page.offset()).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.create(&data).await
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, &data).await
    }

    /// Delete an author together with its books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    /// List books ordered by title
    pub async fn list_books(&self, page: &PageRequest) -> AppResult<(Vec<Book>, i64)> {
        let (books, total) = self.repository.books.list(page.limit(), page.offset()).await?;
        tracing::debug!("Listed {} of {} books (page {})", books.len(), total, page.page);
        Ok((books, total))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.require_author(data.author_id).await?;
        self.repository.books.create(&data).await
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.repository.books.get_by_id(id).await?;
        if let Some(author_id) = data.author_id {
            self.require_author(author_id).await?;
        }
        self.repository.books.update(id, &data).await
    }

    /// Delete a book; refused while copies are out on loan
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;
        let active = self.repository.loans.count_active_for_book(id).await?;
        if active > 0 {
            return Err(AppError::Conflict(format!("Book has {} active loan(s)", active)));
        }
        self.repository.books.delete(id).await
    }

    async fn require_author(&self, author_id: i32) -> AppResult<()> {
        match self.repository.authors.get_by_id(author_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => {
                Err(AppError::BadRequest("Author does not exist.".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
