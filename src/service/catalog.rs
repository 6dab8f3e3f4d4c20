use crate::database::book::BookRepository;
use crate::error::app_error::AppError;
use crate::models::book::{Book, BookRequest};
use crate::models::filter::BookFilters;
use chrono::Utc;
use tracing::info;

pub struct BookCatalog<'a, R: BookRepository> {
    repo: &'a R,
}

impl<'a, R: BookRepository> BookCatalog<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Insert a book stamped with the current time. A reused ISBN is a `Conflict`.
    pub async fn create_book(&self, request: &BookRequest) -> Result<Book, AppError> {
        let book = self.repo.create_book(request, Utc::now().timestamp()).await?;
        info!(book_id = book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, AppError> {
        self.repo
            .get_book_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, AppError> {
        self.repo.list_books(&BookFilters::new()).await
    }

    /// Books matching every predicate, in id order. No predicates means every book.
    pub async fn search_books(&self, filters: &BookFilters) -> Result<Vec<Book>, AppError> {
        if filters.is_empty() {
            return self.get_all_books().await;
        }
        self.repo.list_books(filters).await
    }

    /// Replace every field of an existing book; unknown ids are `NotFound`.
    pub async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Book, AppError> {
        let book = self
            .repo
            .update_book(id, request)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        info!(book_id = book.id, "Book updated");
        Ok(book)
    }

    /// Idempotent: deleting an absent book succeeds.
    pub async fn delete_book(&self, id: i64) -> Result<(), AppError> {
        if self.repo.delete_book(id).await? > 0 {
            info!(book_id = id, "Book deleted");
        }
        Ok(())
    }
}
