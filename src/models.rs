pub mod book;
pub mod filter;
pub mod message;
pub mod pagination;
pub mod session;
pub mod user;
