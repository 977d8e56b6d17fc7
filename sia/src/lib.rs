pub mod config;
pub mod confirmation;
pub mod error;
pub mod models;
pub mod ocr;
pub mod processing;
pub mod remote;
pub mod render;
pub mod validation;

pub use error::{Result, SiaError};
