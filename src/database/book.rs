use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::book::{Book, BookRequest};
use crate::models::filter::{BookFilters, FilterOp, FilterValue};
use sqlx::{QueryBuilder, Sqlite};

const BOOK_COLUMNS: &str = "id, title, author, isbn, published_year, genre, created_at";

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    async fn create_book(&self, request: &BookRequest, created_at: i64) -> Result<Book, AppError>;
    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, AppError>;
    async fn list_books(&self, filters: &BookFilters) -> Result<Vec<Book>, AppError>;
    /// Replace every mutable field. `None` when no book has this id.
    async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Option<Book>, AppError>;
    async fn delete_book(&self, id: i64) -> Result<u64, AppError>;
}

/// Append `WHERE ... AND ...` for the predicates, binding every value.
pub(crate) fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &BookFilters) {
    for (i, predicate) in filters.predicates().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });

        let column = predicate.field.column();
        match predicate.op {
            // instr() is case-sensitive and has no wildcard characters, unlike LIKE.
            FilterOp::Contains => {
                builder.push(format!("instr({}, ", column));
                push_value(builder, &predicate.value);
                builder.push(") > 0");
            }
            FilterOp::Equals => {
                builder.push(format!("{} = ", column));
                push_value(builder, &predicate.value);
            }
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    match value {
        FilterValue::Text(text) => builder.push_bind(text.clone()),
        FilterValue::Integer(n) => builder.push_bind(*n),
    };
}

#[async_trait::async_trait]
impl BookRepository for SqliteRepository {
    async fn create_book(&self, request: &BookRequest, created_at: i64) -> Result<Book, AppError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, isbn, published_year, genre, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&request.title)
        .bind(&request.author)
        .bind(&request.isbn)
        .bind(request.published_year)
        .bind(&request.genre)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).with_conflict_message(format!("Book with ISBN {} already exists", request.isbn)))?;

        Ok(book)
    }

    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn list_books(&self, filters: &BookFilters) -> Result<Vec<Book>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY id ASC");

        let books = builder.build_query_as::<Book>().fetch_all(&self.pool).await?;

        Ok(books)
    }

    async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = ?, author = ?, isbn = ?, published_year = ?, genre = ?
            WHERE id = ?
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&request.title)
        .bind(&request.author)
        .bind(&request.isbn)
        .bind(request.published_year)
        .bind(&request.genre)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from(e).with_conflict_message(format!("Book with ISBN {} already exists", request.isbn)))?;

        Ok(book)
    }

    async fn delete_book(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{book_request, test_repository};

    #[test]
    fn filters_become_bound_predicates() {
        let filters = BookFilters::new().title_contains("Old").published_year_equals(2023);
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM books");
        push_filters(&mut builder, &filters);

        assert_eq!(builder.sql(), "SELECT * FROM books WHERE instr(title, ?) > 0 AND published_year = ?");
    }

    #[test]
    fn no_filters_no_where_clause() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM books");
        push_filters(&mut builder, &BookFilters::new());
        assert_eq!(builder.sql(), "SELECT * FROM books");
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = test_repository().await;
        let request = book_request("Test Book", "1234567890-1111");

        let created = repo.create_book(&request, 1_700_000_000).await.unwrap();
        let fetched = repo.get_book_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Test Book");
        assert_eq!(fetched.author, request.author);
        assert_eq!(fetched.isbn, "1234567890-1111");
        assert_eq!(fetched.published_year, Some(2024));
        assert_eq!(fetched.genre.as_deref(), Some("Fiction"));
        assert_eq!(fetched.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn duplicate_isbn_conflicts_and_keeps_original() {
        let repo = test_repository().await;
        let original = repo.create_book(&book_request("First", "dup-isbn"), 1).await.unwrap();

        let err = repo.create_book(&book_request("Second", "dup-isbn"), 2).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg.contains("dup-isbn")));

        let stored = repo.get_book_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored, original);
        assert_eq!(repo.list_books(&BookFilters::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn filters_are_anded_and_case_sensitive() {
        let repo = test_repository().await;
        repo.create_book(&book_request("Old Title", "isbn-1"), 1).await.unwrap();
        repo.create_book(&book_request("Old Man and the Sea", "isbn-2"), 1).await.unwrap();
        let mut mystery = book_request("Old Secrets", "isbn-3");
        mystery.genre = Some("Mystery".to_string());
        mystery.published_year = Some(2023);
        repo.create_book(&mystery, 1).await.unwrap();

        let old = repo.list_books(&BookFilters::new().title_contains("Old")).await.unwrap();
        assert_eq!(old.len(), 3);

        let lower = repo.list_books(&BookFilters::new().title_contains("old")).await.unwrap();
        assert!(lower.is_empty());

        let narrowed = repo
            .list_books(&BookFilters::new().title_contains("Old").genre_contains("Myst").published_year_equals(2023))
            .await
            .unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].isbn, "isbn-3");

        let exact = repo.list_books(&BookFilters::new().isbn_equals("isbn")).await.unwrap();
        assert!(exact.is_empty());
    }

    #[tokio::test]
    async fn wildcard_characters_match_literally() {
        let repo = test_repository().await;
        repo.create_book(&book_request("100% Rust", "isbn-1"), 1).await.unwrap();
        repo.create_book(&book_request("Plain", "isbn-2"), 1).await.unwrap();

        let found = repo.list_books(&BookFilters::new().title_contains("%")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "100% Rust");
    }

    #[tokio::test]
    async fn listing_is_in_insertion_order() {
        let repo = test_repository().await;
        for i in 0..5 {
            repo.create_book(&book_request(&format!("Book {}", i), &format!("isbn-{}", i)), 1).await.unwrap();
        }

        let books = repo.list_books(&BookFilters::new()).await.unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 0", "Book 1", "Book 2", "Book 3", "Book 4"]);
    }

    #[tokio::test]
    async fn update_replaces_fields_or_reports_absence() {
        let repo = test_repository().await;
        let book = repo.create_book(&book_request("Old Title", "isbn-1"), 5).await.unwrap();

        let mut replacement = book_request("Updated Title", "isbn-9");
        replacement.genre = None;
        let updated = repo.update_book(book.id, &replacement).await.unwrap().unwrap();

        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.isbn, "isbn-9");
        assert_eq!(updated.genre, None);
        assert_eq!(updated.created_at, 5);

        assert!(repo.update_book(9999, &replacement).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = test_repository().await;
        let book = repo.create_book(&book_request("Gone", "isbn-1"), 1).await.unwrap();

        assert_eq!(repo.delete_book(book.id).await.unwrap(), 1);
        assert_eq!(repo.delete_book(book.id).await.unwrap(), 0);
        assert!(repo.get_book_by_id(book.id).await.unwrap().is_none());
    }
}
