use crate::auth::CurrentUser;
use crate::config::PaginationConfig;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::book::{Book, BookQuery, BookRequest};
use crate::models::filter::BookFilters;
use crate::models::message::MessageResponse;
use crate::models::pagination::{PaginatedResponse, PaginationParams, paginate};
use crate::service::catalog::BookCatalog;
use rocket::http::Status;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::SqlitePool;
use validator::Validate;

#[derive(Serialize, Debug)]
pub struct BookCreatedResponse {
    pub message: String,
    pub id: i64,
}

#[rocket::get("/books?<query..>")]
pub async fn list_books(pool: &State<SqlitePool>, pagination_config: &State<PaginationConfig>, query: BookQuery) -> Result<Json<PaginatedResponse<Book>>, AppError> {
    let filters = query.filters()?;
    let params = PaginationParams::parse(query.page.as_deref(), query.per_page.as_deref(), pagination_config)?;

    let repo = SqliteRepository::new(pool.inner().clone());
    let books = BookCatalog::new(&repo).search_books(&filters).await?;
    if books.is_empty() {
        return Err(AppError::NotFound("No books found".to_string()));
    }

    Ok(Json(paginate(books, params)?))
}

#[rocket::get("/books/search?<title>")]
pub async fn search_books(pool: &State<SqlitePool>, title: Option<String>) -> Result<Json<Vec<Book>>, AppError> {
    let title = title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?;

    let repo = SqliteRepository::new(pool.inner().clone());
    let books = BookCatalog::new(&repo).search_books(&BookFilters::new().title_contains(title)).await?;
    if books.is_empty() {
        return Err(AppError::NotFound("No books found matching the title".to_string()));
    }

    Ok(Json(books))
}

#[rocket::get("/book/<id>")]
pub async fn get_book(pool: &State<SqlitePool>, id: i64) -> Result<Json<Book>, AppError> {
    let repo = SqliteRepository::new(pool.inner().clone());
    let book = BookCatalog::new(&repo).get_book(id).await?;
    Ok(Json(book))
}

#[rocket::post("/book", data = "<payload>")]
pub async fn create_book(pool: &State<SqlitePool>, _current_user: CurrentUser, payload: JsonBody<BookRequest>) -> Result<(Status, Json<BookCreatedResponse>), AppError> {
    payload.validate()?;

    let repo = SqliteRepository::new(pool.inner().clone());
    let book = BookCatalog::new(&repo).create_book(&payload).await?;

    Ok((
        Status::Created,
        Json(BookCreatedResponse {
            message: "Book created successfully".to_string(),
            id: book.id,
        }),
    ))
}

#[rocket::put("/book/<id>", data = "<payload>")]
pub async fn put_book(pool: &State<SqlitePool>, _current_user: CurrentUser, id: i64, payload: JsonBody<BookRequest>) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let repo = SqliteRepository::new(pool.inner().clone());
    BookCatalog::new(&repo).update_book(id, &payload).await?;

    Ok(Json(MessageResponse::new("Book updated successfully")))
}

#[rocket::delete("/book/<id>")]
pub async fn delete_book(pool: &State<SqlitePool>, _current_user: CurrentUser, id: i64) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository::new(pool.inner().clone());
    BookCatalog::new(&repo).delete_book(id).await?;

    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_books, search_books, get_book, create_book, put_book, delete_book]
}
