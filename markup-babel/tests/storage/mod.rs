//! Storage format tests
//!
//! Tests for canonical ↔ storage conversion and macro rewriting.

mod decode;
mod encode;
