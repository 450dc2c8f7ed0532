//! Format implementations
//!
//! One module per backend form, each converting between canonical text and that form.

pub mod adf;
pub mod storage;
pub mod wiki;

pub use adf::AdfFormat;
pub use storage::{StorageFormat, StorageOptions};
pub use wiki::{WikiFormat, WikiOptions};
