pub mod config;
pub mod error;
pub mod format;
pub mod harvest;
pub mod model;
pub mod parser;
pub mod query;
pub mod storage;
pub mod xml;

pub use error::{Result, ScrapeError};
