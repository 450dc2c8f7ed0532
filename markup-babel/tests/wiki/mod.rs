//! Wiki markup tests
//!
//! Tests for bidirectional canonical ↔ wiki conversion.

mod decode;
mod encode;
mod properties;
