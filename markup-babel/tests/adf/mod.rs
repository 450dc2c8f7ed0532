//! Rich document tree tests
//!
//! Encoding canonical text into trees and extracting plain text back out.

mod encode;
mod extract;
mod properties;
