pub mod book;
pub mod session;
pub mod sqlite_repository;
pub mod user;
