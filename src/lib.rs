pub mod config;
pub mod error;
pub mod scoring;
pub mod server;

pub use error::{Error, ErrorResponse, Result};
