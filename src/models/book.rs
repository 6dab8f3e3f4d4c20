use crate::error::app_error::AppError;
use crate::models::filter::BookFilters;
use crate::models::pagination::parse_integer;
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i64>,
    pub genre: Option<String>,
    pub created_at: i64,
}

/// Full set of mutable book fields. Updates replace every field.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct BookRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(length(min = 1, max = 32))]
    pub isbn: String,
    #[serde(default)]
    pub published_year: Option<i64>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Raw `GET /books` query string. Values stay strings so that malformed
/// integers can be reported instead of silently dropped.
#[derive(FromForm, Debug, Default)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl BookQuery {
    pub fn filters(&self) -> Result<BookFilters, AppError> {
        let mut filters = BookFilters::new();

        if let Some(title) = present(&self.title) {
            filters = filters.title_contains(title);
        }
        if let Some(author) = present(&self.author) {
            filters = filters.author_contains(author);
        }
        if let Some(isbn) = present(&self.isbn) {
            filters = filters.isbn_equals(isbn);
        }
        if let Some(genre) = present(&self.genre) {
            filters = filters.genre_contains(genre);
        }
        if let Some(year) = parse_integer("published_year", self.published_year.as_deref())? {
            filters = filters.published_year_equals(year);
        }

        Ok(filters)
    }
}
