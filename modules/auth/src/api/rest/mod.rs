pub mod dto;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod routes;
